//! Line items

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::money::Price;

/// Label used in merge keys for additions without a chosen size.
const DEFAULT_SIZE_LABEL: &str = "default";

/// Computes the merge key for a product and optional size label.
#[must_use]
pub fn line_key(product_id: &str, size: Option<&str>) -> String {
    format!("{product_id}:{}", size.unwrap_or(DEFAULT_SIZE_LABEL))
}

/// One row in the cart: a unique (product, size) combination and its quantity.
///
/// Name and unit price are snapshots taken when the line was first created;
/// later additions of the same (product, size) accumulate quantity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    id: String,
    product_id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<String>,
    #[serde(rename = "price")]
    unit_price: Price,
    quantity: u32,
}

impl LineItem {
    /// Returns the merge key identifying this line.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the catalogue product this line was created from.
    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Returns the display name snapshot.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the size label, if one was chosen.
    #[must_use]
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    /// Returns the unit price snapshot.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Returns the line quantity (always at least one).
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        debug_assert!(quantity >= 1, "stored lines must keep quantity >= 1");
        self.quantity = quantity;
    }
}

/// A candidate addition, validated at the UI boundary.
///
/// The quantity is non-zero by construction; a request for zero items never
/// reaches the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Catalogue product being added.
    pub product_id: String,

    /// Display name captured at the moment of the addition.
    pub name: String,

    /// Chosen size label, if any.
    pub size: Option<String>,

    /// Unit price captured at the moment of the addition.
    pub unit_price: Price,

    /// Number of items to add.
    pub quantity: NonZeroU32,
}

impl Candidate {
    /// Computes the merge key for this candidate.
    #[must_use]
    pub fn key(&self) -> String {
        line_key(&self.product_id, self.size.as_deref())
    }
}

/// Outcome of folding a candidate into a line collection.
#[derive(Debug)]
pub struct Resolution {
    /// The resulting line collection.
    pub next_lines: Vec<LineItem>,

    /// The folded line's quantity after the addition.
    pub line_quantity: u32,
}

/// Folds a candidate addition into an existing line collection.
///
/// If a line with the candidate's merge key exists, its quantity accumulates
/// and every other field is left untouched (first write wins for name and
/// price). Otherwise a new line is appended, preserving insertion order.
/// The input collection is never modified.
#[must_use]
pub fn resolve_add(lines: &[LineItem], candidate: &Candidate) -> Resolution {
    let key = candidate.key();
    let mut next_lines = lines.to_vec();

    if let Some(existing) = next_lines.iter_mut().find(|line| line.id == key) {
        existing.quantity = existing.quantity.saturating_add(candidate.quantity.get());

        let line_quantity = existing.quantity;

        return Resolution {
            next_lines,
            line_quantity,
        };
    }

    let line_quantity = candidate.quantity.get();

    next_lines.push(LineItem {
        id: key,
        product_id: candidate.product_id.clone(),
        name: candidate.name.clone(),
        size: candidate.size.clone(),
        unit_price: candidate.unit_price,
        quantity: line_quantity,
    });

    Resolution {
        next_lines,
        line_quantity,
    }
}
