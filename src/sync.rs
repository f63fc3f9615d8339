//! Cross-context synchronisation

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::{
    snapshot::{CART_SLOT_KEY, SnapshotSlot},
    store::CartStore,
};

/// A change observed on a durable slot: the slot key and its new raw value
/// (`None` when the slot was cleared).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
    /// Key of the slot that changed.
    pub key: String,

    /// New raw value, or `None` if the slot was cleared.
    pub value: Option<String>,
}

impl SlotChange {
    /// Creates a change notification.
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Source of external change notifications for durable slots.
///
/// Abstracts the host notification mechanism (for example, browser storage
/// events) behind a narrow subscribe/unsubscribe surface so the
/// synchronizer can run against a fake in tests.
pub trait ChangeNotifier {
    /// Starts delivering changes for the given slot key.
    fn subscribe(&mut self, key: &str);

    /// Stops delivering changes for the given slot key.
    fn unsubscribe(&mut self, key: &str);

    /// Returns the next pending change for a subscribed key, if any.
    fn try_next(&mut self) -> Option<SlotChange>;
}

/// Queue-backed notifier for hosts that deliver change events by hand.
///
/// Changes pushed for keys without a subscription are dropped.
#[derive(Debug, Default)]
pub struct QueueNotifier {
    keys: FxHashSet<String>,
    pending: VecDeque<SlotChange>,
}

impl QueueNotifier {
    /// Creates a notifier with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a change observed by the host.
    pub fn push(&mut self, change: SlotChange) {
        if self.keys.contains(&change.key) {
            self.pending.push_back(change);
        }
    }

    /// Number of changes waiting to be drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl ChangeNotifier for QueueNotifier {
    fn subscribe(&mut self, key: &str) {
        self.keys.insert(key.to_string());
    }

    fn unsubscribe(&mut self, key: &str) {
        self.keys.remove(key);
        self.pending.retain(|change| change.key != key);
    }

    fn try_next(&mut self) -> Option<SlotChange> {
        self.pending.pop_front()
    }
}

/// Keeps an in-memory cart store consistent with external writes to its
/// durable slot.
///
/// Reconciliation replaces local state wholesale with each observed
/// snapshot: last writer wins at whole-cart granularity, with no
/// field-level merge or conflict detection. Local edits that were never
/// persisted before another context's write is observed are dropped; this
/// is the documented behaviour, not a defect.
#[derive(Debug)]
pub struct CartSynchronizer<N: ChangeNotifier> {
    notifier: N,
    key: String,
}

impl<N: ChangeNotifier> CartSynchronizer<N> {
    /// Subscribes to changes for the well-known cart slot.
    pub fn attach(notifier: N) -> Self {
        Self::attach_to(notifier, CART_SLOT_KEY)
    }

    /// Subscribes to changes for a custom slot key.
    pub fn attach_to(mut notifier: N, key: impl Into<String>) -> Self {
        let key = key.into();

        notifier.subscribe(&key);

        Self { notifier, key }
    }

    /// Returns the slot key this synchronizer watches.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the notifier, for hosts that deliver events into it.
    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Drains pending notifications into the store.
    ///
    /// Changes for other keys are ignored. Returns the number of
    /// notifications that replaced local state.
    pub fn reconcile<S: SnapshotSlot>(&mut self, store: &mut CartStore<S>) -> usize {
        let mut applied = 0;

        while let Some(change) = self.notifier.try_next() {
            if change.key != self.key {
                continue;
            }

            if store.apply_external(change.value.as_deref()) {
                applied += 1;
            }
        }

        if applied > 0 {
            debug!(applied, "reconciled cart from external changes");
        }

        applied
    }

    /// Unsubscribes and releases the notifier.
    pub fn detach(mut self) -> N {
        self.notifier.unsubscribe(&self.key);

        self.notifier
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rusty_money::iso::CLP;
    use testresult::TestResult;

    use crate::{
        lines::Candidate,
        money::Price,
        snapshot::{self, MemorySlot},
    };

    use super::*;

    fn candidate(product_id: &str, unit_price: u64, qty: u32) -> Candidate {
        Candidate {
            product_id: product_id.to_string(),
            name: format!("Product {product_id}"),
            size: None,
            unit_price: Price::from_minor(unit_price),
            quantity: NonZeroU32::new(qty).expect("test quantities are non-zero"),
        }
    }

    fn store() -> CartStore<MemorySlot> {
        CartStore::open(MemorySlot::new(), CLP)
    }

    #[test]
    fn queue_notifier_drops_unsubscribed_keys() {
        let mut notifier = QueueNotifier::new();

        notifier.push(SlotChange::new("cart", None));

        assert_eq!(notifier.pending(), 0);

        notifier.subscribe("cart");
        notifier.push(SlotChange::new("cart", None));
        notifier.push(SlotChange::new("theme", None));

        assert_eq!(notifier.pending(), 1);
    }

    #[test]
    fn queue_notifier_unsubscribe_discards_pending() {
        let mut notifier = QueueNotifier::new();

        notifier.subscribe("cart");
        notifier.push(SlotChange::new("cart", None));
        notifier.unsubscribe("cart");

        assert_eq!(notifier.try_next(), None);
    }

    #[test]
    fn reconcile_replaces_local_state() -> TestResult {
        let mut writer = store();

        writer.add(&candidate("p1", 1000, 1));
        writer.add(&candidate("p2", 500, 1));
        writer.add(&candidate("p3", 250, 1));

        let raw = snapshot::encode(writer.cart())?;

        let mut reader = store();

        reader.add(&candidate("other", 9999, 1));

        let mut synchronizer = CartSynchronizer::attach(QueueNotifier::new());

        synchronizer
            .notifier_mut()
            .push(SlotChange::new(CART_SLOT_KEY, Some(raw)));

        assert_eq!(synchronizer.reconcile(&mut reader), 1);
        assert_eq!(reader.cart(), writer.cart());

        Ok(())
    }

    #[test]
    fn reconcile_applies_last_writer_wins() -> TestResult {
        let mut first = store();
        let mut second = store();

        first.add(&candidate("p1", 1000, 1));
        second.add(&candidate("p2", 500, 2));

        let first_raw = snapshot::encode(first.cart())?;
        let second_raw = snapshot::encode(second.cart())?;

        let mut reader = store();
        let mut synchronizer = CartSynchronizer::attach(QueueNotifier::new());

        synchronizer
            .notifier_mut()
            .push(SlotChange::new(CART_SLOT_KEY, Some(first_raw)));
        synchronizer
            .notifier_mut()
            .push(SlotChange::new(CART_SLOT_KEY, Some(second_raw)));

        assert_eq!(synchronizer.reconcile(&mut reader), 2);
        assert_eq!(reader.cart(), second.cart());

        Ok(())
    }

    #[test]
    fn reconcile_treats_cleared_slot_as_empty_cart() {
        let mut reader = store();

        reader.add(&candidate("p1", 1000, 1));

        let mut synchronizer = CartSynchronizer::attach(QueueNotifier::new());

        synchronizer
            .notifier_mut()
            .push(SlotChange::new(CART_SLOT_KEY, None));

        assert_eq!(synchronizer.reconcile(&mut reader), 1);
        assert!(reader.cart().is_empty());
    }

    #[test]
    fn reconcile_treats_garbage_as_empty_cart() {
        let mut reader = store();

        reader.add(&candidate("p1", 1000, 1));

        let mut synchronizer = CartSynchronizer::attach(QueueNotifier::new());

        synchronizer
            .notifier_mut()
            .push(SlotChange::new(CART_SLOT_KEY, Some("garbage".to_string())));

        assert_eq!(synchronizer.reconcile(&mut reader), 1);
        assert!(reader.cart().is_empty());
    }

    #[test]
    fn reconcile_ignores_other_keys() {
        let mut reader = store();

        reader.add(&candidate("p1", 1000, 1));

        let mut notifier = QueueNotifier::new();

        notifier.subscribe("theme");

        let mut synchronizer = CartSynchronizer::attach(notifier);

        synchronizer
            .notifier_mut()
            .push(SlotChange::new("theme", Some("dark".to_string())));

        assert_eq!(synchronizer.reconcile(&mut reader), 0);
        assert_eq!(reader.cart().total_items(), 1);
    }

    #[test]
    fn detach_unsubscribes() {
        let synchronizer = CartSynchronizer::attach(QueueNotifier::new());
        let mut notifier = synchronizer.detach();

        notifier.push(SlotChange::new(CART_SLOT_KEY, None));

        assert_eq!(notifier.try_next(), None);
    }
}
