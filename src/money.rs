//! Prices

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors converting a price into display money.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is too large to represent in signed minor units.
    #[error("amount {0} is too large to represent in minor units")]
    Overflow(u64),
}

/// A non-negative price in minor units (cents, pence, whole pesos).
///
/// Aggregation saturates at the top of the range rather than wrapping.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price {
    value: u64,
}

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self { value: 0 };

    /// Creates a new price from minor units.
    #[must_use]
    pub const fn from_minor(value: u64) -> Self {
        Self { value }
    }

    /// Returns the price in minor units.
    #[must_use]
    pub const fn minor_units(self) -> u64 {
        self.value
    }

    /// Multiplies the price by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self {
            value: self.value.saturating_mul(u64::from(quantity)),
        }
    }

    /// Adds two prices.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self {
            value: self.value.saturating_add(other.value),
        }
    }

    /// Returns the price as a decimal number of minor units.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.value)
    }

    /// Converts the price to display money in the given currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the amount does not fit in signed
    /// minor units.
    pub fn money(self, currency: &'static Currency) -> Result<Money<'static, Currency>, PriceError> {
        match i64::try_from(self.value) {
            Ok(minor) => Ok(Money::from_minor(minor, currency)),
            Err(_err) => Err(PriceError::Overflow(self.value)),
        }
    }
}
