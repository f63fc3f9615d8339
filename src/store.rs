//! Cart store

use rusty_money::iso::Currency;
use tracing::debug;

use crate::{
    cart::Cart,
    lines::{Candidate, resolve_add},
    money::Price,
    snapshot::{self, SnapshotSlot, SnapshotStore},
    totals::{Rates, Totals, TotalsError, totals},
};

/// Immediate feedback returned from [`CartStore::add`], computed from the
/// new state so callers can report accurate quantities without a second
/// read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// Resulting quantity of the folded line.
    pub line_quantity: u32,

    /// Sum of all line quantities after the addition.
    pub total_items: u64,

    /// Sum of all line totals after the addition.
    pub total_amount: Price,
}

/// Owns the authoritative in-memory cart snapshot and its mutation surface.
///
/// Every mutation replaces the snapshot wholesale and triggers a
/// best-effort persistence write. Mutations are total: given well-typed
/// input they always succeed.
#[derive(Debug)]
pub struct CartStore<S: SnapshotSlot> {
    cart: Cart,
    persistence: SnapshotStore<S>,
    currency: &'static Currency,
}

impl<S: SnapshotSlot> CartStore<S> {
    /// Opens a store over a durable slot, hydrating any persisted snapshot.
    ///
    /// A missing or corrupt snapshot yields an empty cart.
    pub fn open(slot: S, currency: &'static Currency) -> Self {
        let persistence = SnapshotStore::new(slot);
        let cart = persistence.load();

        Self {
            cart,
            persistence,
            currency,
        }
    }

    /// Returns the current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Returns the currency totals are derived in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Returns the underlying durable slot.
    pub fn slot(&self) -> &S {
        self.persistence.slot()
    }

    /// Folds a candidate addition into the cart.
    pub fn add(&mut self, candidate: &Candidate) -> AddOutcome {
        let resolution = resolve_add(self.cart.lines(), candidate);
        let line_quantity = resolution.line_quantity;

        debug!(key = %candidate.key(), line_quantity, "adding to cart");

        self.commit(Cart::from_lines(resolution.next_lines));

        AddOutcome {
            line_quantity,
            total_items: self.cart.total_items(),
            total_amount: self.cart.total_amount(),
        }
    }

    /// Replaces a line's quantity, leaving order and all other fields
    /// untouched.
    ///
    /// A quantity of zero behaves exactly like [`CartStore::remove`].
    /// An unknown id is a no-op.
    pub fn set_quantity(&mut self, line_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(line_id);

            return;
        }

        if self.cart.line(line_id).is_none() {
            return;
        }

        debug!(%line_id, quantity, "updating line quantity");

        let next = self
            .cart
            .iter()
            .cloned()
            .map(|mut line| {
                if line.id() == line_id {
                    line.set_quantity(quantity);
                }

                line
            })
            .collect();

        self.commit(Cart::from_lines(next));
    }

    /// Deletes a line if present, preserving the order of the remaining
    /// lines. An unknown id is a no-op.
    pub fn remove(&mut self, line_id: &str) {
        if self.cart.line(line_id).is_none() {
            return;
        }

        debug!(%line_id, "removing cart line");

        let next = self
            .cart
            .iter()
            .filter(|line| line.id() != line_id)
            .cloned()
            .collect();

        self.commit(Cart::from_lines(next));
    }

    /// Replaces the cart with an empty snapshot.
    pub fn clear(&mut self) {
        debug!("clearing cart");

        self.commit(Cart::new());
    }

    /// Derives checkout totals from the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if a derived amount cannot be represented
    /// in minor units.
    pub fn totals(&self, rates: Rates) -> Result<Totals, TotalsError> {
        totals(&self.cart, rates, self.currency)
    }

    /// Replaces in-memory state wholesale with an externally written
    /// snapshot, as observed by the cross-context synchronizer.
    ///
    /// An absent or unparseable value is treated as an empty cart. Returns
    /// whether the state changed. The replacement is not written back to
    /// the slot; the external writer already owns the persisted value.
    pub fn apply_external(&mut self, raw: Option<&str>) -> bool {
        let next = match raw {
            Some(raw) => snapshot::decode(raw),
            None => Cart::new(),
        };

        if next == self.cart {
            return false;
        }

        debug!(lines = next.len(), "replacing cart from external snapshot");

        self.cart = next;

        true
    }

    fn commit(&mut self, next: Cart) {
        self.cart = next;
        self.persistence.save(&self.cart);
    }
}
