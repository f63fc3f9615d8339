//! Totals

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::cart::Cart;

/// Errors that can occur while deriving checkout totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// A rate falls outside the inclusive `0..=1` range.
    #[error("{0} rate {1} is outside the 0..=1 range")]
    RateOutOfRange(&'static str, f64),

    /// A derived amount cannot be represented in minor units.
    #[error("derived amount cannot be represented in minor units")]
    AmountOverflow,
}

/// Tax and discount rates applied when deriving checkout totals.
///
/// Both rates are fractions: `0.19` is a 19% tax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    tax: Percentage,
    discount: Percentage,
}

impl Rates {
    /// Creates a rate pair from fractional tax and discount rates.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::RateOutOfRange`] if either rate falls outside
    /// the inclusive `0..=1` range.
    pub fn new(tax_rate: f64, discount_rate: f64) -> Result<Self, TotalsError> {
        if !(0.0..=1.0).contains(&tax_rate) {
            return Err(TotalsError::RateOutOfRange("tax", tax_rate));
        }

        if !(0.0..=1.0).contains(&discount_rate) {
            return Err(TotalsError::RateOutOfRange("discount", discount_rate));
        }

        Ok(Self {
            tax: Percentage::from(tax_rate),
            discount: Percentage::from(discount_rate),
        })
    }

    /// Returns the tax rate.
    #[must_use]
    pub fn tax(&self) -> Percentage {
        self.tax
    }

    /// Returns the discount rate.
    #[must_use]
    pub fn discount(&self) -> Percentage {
        self.discount
    }
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            tax: Percentage::from(0.0),
            discount: Percentage::from(0.0),
        }
    }
}

/// Derived checkout totals. Never persisted; computed from a cart snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    subtotal: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    tax: Money<'static, Currency>,
    total: Money<'static, Currency>,
    currency: &'static Currency,
}

impl Totals {
    /// Total amount before discount and tax.
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Discount amount, never exceeding the subtotal.
    #[must_use]
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    /// Tax on the discounted base.
    #[must_use]
    pub fn tax(&self) -> Money<'static, Currency> {
        self.tax
    }

    /// Amount payable: `subtotal - discount + tax`.
    #[must_use]
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Derives checkout totals for a cart snapshot.
///
/// `discount = min(subtotal × discount_rate, subtotal)`,
/// `tax = (subtotal − discount) × tax_rate`,
/// `total = subtotal − discount + tax`. Monetary results are rounded to
/// whole minor units, midpoint away from zero. Safe to call on an empty
/// cart, which yields all-zero totals.
///
/// # Errors
///
/// Returns [`TotalsError::AmountOverflow`] if a derived amount cannot be
/// represented in minor units.
pub fn totals(cart: &Cart, rates: Rates, currency: &'static Currency) -> Result<Totals, TotalsError> {
    let subtotal = cart.total_amount().to_decimal();

    let discount = round_minor(rates.discount() * subtotal)
        .min(subtotal)
        .max(Decimal::ZERO);

    let tax = round_minor(rates.tax() * (subtotal - discount));
    let total = subtotal - discount + tax;

    Ok(Totals {
        subtotal: money_from_minor(subtotal, currency)?,
        discount: money_from_minor(discount, currency)?,
        tax: money_from_minor(tax, currency)?,
        total: money_from_minor(total, currency)?,
        currency,
    })
}

/// Rounds a decimal amount to whole minor units.
fn round_minor(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn money_from_minor(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalsError> {
    let minor = amount.to_i64().ok_or(TotalsError::AmountOverflow)?;

    Ok(Money::from_minor(minor, currency))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rusty_money::iso::CLP;
    use testresult::TestResult;

    use crate::{
        lines::{Candidate, resolve_add},
        money::Price,
    };

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
    fn totals_with_tax_and_no_discount() -> TestResult {
        let cart = cart_with(&[(1000, 2), (500, 1)]);
        let totals = totals(&cart, Rates::new(0.19, 0.0)?, CLP)?;

        assert_eq!(totals.subtotal(), Money::from_minor(2500, CLP));
        assert_eq!(totals.discount(), Money::from_minor(0, CLP));
        assert_eq!(totals.tax(), Money::from_minor(475, CLP));
        assert_eq!(totals.total(), Money::from_minor(2975, CLP));

        Ok(())
    }

    #[test]
    fn totals_applies_discount_before_tax() -> TestResult {
        let cart = cart_with(&[(1000, 1)]);
        let totals = totals(&cart, Rates::new(0.10, 0.50)?, CLP)?;

        assert_eq!(totals.discount(), Money::from_minor(500, CLP));
        assert_eq!(totals.tax(), Money::from_minor(50, CLP));
        assert_eq!(totals.total(), Money::from_minor(550, CLP));

        Ok(())
    }

    #[test]
    fn totals_discount_never_exceeds_subtotal() -> TestResult {
        let cart = cart_with(&[(1000, 1)]);
        let totals = totals(&cart, Rates::new(0.0, 1.0)?, CLP)?;

        assert_eq!(totals.discount(), Money::from_minor(1000, CLP));
        assert_eq!(totals.total(), Money::from_minor(0, CLP));

        Ok(())
    }

    #[test]
    fn totals_on_empty_cart_are_zero() -> TestResult {
        let totals = totals(&Cart::new(), Rates::new(0.19, 0.10)?, CLP)?;

        assert_eq!(totals.subtotal(), Money::from_minor(0, CLP));
        assert_eq!(totals.discount(), Money::from_minor(0, CLP));
        assert_eq!(totals.tax(), Money::from_minor(0, CLP));
        assert_eq!(totals.total(), Money::from_minor(0, CLP));

        Ok(())
    }

    #[test]
    fn totals_rounds_midpoint_away_from_zero() -> TestResult {
        // 0.19 × 50 = 9.5, which rounds up to 10.
        let cart = cart_with(&[(50, 1)]);
        let totals = totals(&cart, Rates::new(0.19, 0.0)?, CLP)?;

        assert_eq!(totals.tax(), Money::from_minor(10, CLP));

        Ok(())
    }

    #[test]
    fn rates_reject_out_of_range_tax() {
        assert!(matches!(
            Rates::new(1.5, 0.0),
            Err(TotalsError::RateOutOfRange("tax", _))
        ));
    }

    #[test]
    fn rates_reject_negative_discount() {
        assert!(matches!(
            Rates::new(0.19, -0.1),
            Err(TotalsError::RateOutOfRange("discount", _))
        ));
    }

    #[test]
    fn rates_reject_non_finite_values() {
        assert!(Rates::new(f64::NAN, 0.0).is_err());
        assert!(Rates::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn default_rates_are_zero() -> TestResult {
        let cart = cart_with(&[(1000, 1)]);
        let totals = totals(&cart, Rates::default(), CLP)?;

        assert_eq!(totals.total(), Money::from_minor(1000, CLP));

        Ok(())
    }
}
