//! Cart

use serde::{Deserialize, Serialize};

use crate::{lines::LineItem, money::Price};

/// Aggregate snapshot of the cart: an ordered collection of line items,
/// unique by merge key.
///
/// Serializes transparently as the line array; this is the persisted
/// snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub(crate) fn from_lines(lines: Vec<LineItem>) -> Self {
        debug_assert!(
            lines.iter().all(|line| line.quantity() >= 1),
            "cart lines must keep quantity >= 1"
        );

        Self { lines }
    }

    /// Returns the ordered line items.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Looks up a line by its merge key.
    #[must_use]
    pub fn line(&self, id: &str) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.id() == id)
    }

    /// Iterates over the line items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.iter()
    }

    /// Returns the number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Checks whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity()))
            .sum()
    }

    /// Sum of `unit_price × quantity` over all lines.
    #[must_use]
    pub fn total_amount(&self) -> Price {
        self.lines
            .iter()
            .fold(Price::ZERO, |acc, line| acc.saturating_add(line.line_total()))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use crate::lines::{Candidate, resolve_add};

    use super::*;

    fn cart_with(prices_and_quantities: &[(u64, u32)]) -> Cart {
        let mut lines = Vec::new();

        for (idx, (price, qty)) in prices_and_quantities.iter().enumerate() {
            let candidate = Candidate {
                product_id: format!("p{idx}"),
                name: format!("Product {idx}"),
                size: None,
                unit_price: Price::from_minor(*price),
                quantity: NonZeroU32::new(*qty).expect("test quantities are non-zero"),
            };

            lines = resolve_add(&lines, &candidate).next_lines;
        }

        Cart::from_lines(lines)
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = Cart::new();

        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_amount(), Price::ZERO);
    }

    #[test]
    fn total_items_sums_quantities() {
        let cart = cart_with(&[(1000, 2), (500, 1)]);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn total_amount_sums_line_totals() {
        let cart = cart_with(&[(1000, 2), (500, 1)]);

        assert_eq!(cart.total_amount(), Price::from_minor(2500));
    }

    #[test]
    fn line_lookup_by_merge_key() {
        let cart = cart_with(&[(1000, 2)]);

        assert!(cart.line("p0:default").is_some());
        assert!(cart.line("missing:default").is_none());
    }

    #[test]
    fn iter_returns_lines_in_insertion_order() {
        let cart = cart_with(&[(100, 1), (200, 1), (300, 1)]);

        let prices: Vec<u64> = cart
            .iter()
            .map(|line| line.unit_price().minor_units())
            .collect();

        assert_eq!(prices, vec![100, 200, 300]);
    }
}
