//! Receipts

use std::{fmt, io};

use jiff::{Zoned, civil::Date};
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    lines::LineItem,
    money::PriceError,
    snapshot::SnapshotSlot,
    store::CartStore,
    totals::{Rates, Totals, TotalsError},
};

/// Prefix of generated order codes.
const ORDER_CODE_PREFIX: &str = "RS";

/// Errors that can occur while placing or rendering an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order was placed on an empty cart.
    #[error("cannot place an order on an empty cart")]
    EmptyCart,

    /// Totals could not be derived.
    #[error(transparent)]
    Totals(#[from] TotalsError),

    /// A line amount could not be converted for display.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// IO error
    #[error("IO error")]
    IO,
}

impl From<io::Error> for OrderError {
    fn from(_err: io::Error) -> Self {
        OrderError::IO
    }
}

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cash,

    /// Card on delivery.
    Card,

    /// Online payment.
    Online,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Online => "Online",
        };

        f.write_str(label)
    }
}

/// Customer details captured by the checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    name: String,
    contact_number: String,
    delivery_address: String,
    payment_method: PaymentMethod,
    notes: Option<String>,
}

impl CustomerDetails {
    /// Creates customer details without notes.
    pub fn new(
        name: impl Into<String>,
        contact_number: impl Into<String>,
        delivery_address: impl Into<String>,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            name: name.into(),
            contact_number: contact_number.into(),
            delivery_address: delivery_address.into(),
            payment_method,
            notes: None,
        }
    }

    /// Attaches free-form delivery notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());

        self
    }

    /// Returns the customer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contact number.
    #[must_use]
    pub fn contact_number(&self) -> &str {
        &self.contact_number
    }

    /// Returns the delivery address.
    #[must_use]
    pub fn delivery_address(&self) -> &str {
        &self.delivery_address
    }

    /// Returns the payment method.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Returns the delivery notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// A friendly client-side order code: a date stamp plus a short random
/// suffix, e.g. `RS-20260808-9F21AC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCode(String);

impl OrderCode {
    /// Generates a code for today's date.
    #[must_use]
    pub fn generate() -> Self {
        Self::for_date(Zoned::now().date())
    }

    /// Generates a code for the given date.
    #[must_use]
    pub fn for_date(date: Date) -> Self {
        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(6)
            .collect::<String>()
            .to_uppercase();

        Self(format!(
            "{ORDER_CODE_PREFIX}-{}-{suffix}",
            date.strftime("%Y%m%d")
        ))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finalized order: the frozen line items, derived totals, customer
/// details and the generated order code.
#[derive(Debug, Clone)]
pub struct Order {
    code: OrderCode,
    lines: Vec<LineItem>,
    totals: Totals,
    details: CustomerDetails,
}

impl Order {
    /// Returns the order code.
    #[must_use]
    pub fn code(&self) -> &OrderCode {
        &self.code
    }

    /// Returns the frozen line items.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Returns the totals derived at the moment the order was placed.
    #[must_use]
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Returns the customer details.
    #[must_use]
    pub fn details(&self) -> &CustomerDetails {
        &self.details
    }

    /// Writes a tabular order summary.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] if an amount cannot be converted for
    /// display or the summary cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), OrderError> {
        let currency = self.totals.currency();
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit", "Total"]);

        for line in &self.lines {
            let label = match line.size() {
                Some(size) => format!("{} ({size})", line.name()),
                None => line.name().to_string(),
            };

            builder.push_record([
                label,
                line.quantity().to_string(),
                line.unit_price().money(currency)?.to_string(),
                line.line_total().money(currency)?.to_string(),
            ]);
        }

        let summary: SmallVec<[(&str, String); 4]> = smallvec![
            ("Subtotal", self.totals.subtotal().to_string()),
            ("Discount", self.totals.discount().to_string()),
            ("Tax", self.totals.tax().to_string()),
            ("Total", self.totals.total().to_string()),
        ];

        for (label, value) in summary {
            builder.push_record([label.to_string(), String::new(), String::new(), value]);
        }

        let mut table = builder.build();

        table.with(Style::sharp());
        table.modify(Columns::new(1..), Alignment::right());

        writeln!(out, "Order {}", self.code)?;

        writeln!(
            out,
            "Deliver to: {} ({})",
            self.details.name(),
            self.details.delivery_address()
        )?;

        writeln!(out, "Payment: {}", self.details.payment_method())?;

        if let Some(notes) = self.details.notes() {
            writeln!(out, "Notes: {notes}")?;
        }

        writeln!(out, "{table}")?;

        Ok(())
    }
}

/// Finalizes the order: freezes the cart snapshot and totals, generates an
/// order code, and clears the store.
///
/// # Errors
///
/// Returns [`OrderError::EmptyCart`] if the cart has no lines, or a
/// [`TotalsError`] if totals cannot be derived. The cart is left untouched
/// on error.
pub fn place_order<S: SnapshotSlot>(
    store: &mut CartStore<S>,
    details: CustomerDetails,
    rates: Rates,
) -> Result<Order, OrderError> {
    if store.cart().is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let totals = store.totals(rates)?;
    let lines = store.cart().lines().to_vec();
    let code = OrderCode::generate();

    store.clear();

    Ok(Order {
        code,
        lines,
        totals,
        details,
    })
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use jiff::civil;
    use rusty_money::{Money, iso::CLP};
    use testresult::TestResult;

    use crate::{lines::Candidate, money::Price, snapshot::MemorySlot};

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

    fn details() -> CustomerDetails {
        CustomerDetails::new(
            "Ada",
            "987654321",
            "Av. Siempre Viva 742",
            PaymentMethod::Cash,
        )
    }

    #[test]
    fn order_code_embeds_date_and_suffix() {
        let code = OrderCode::for_date(civil::date(2026, 8, 8));

        assert!(code.as_str().starts_with("RS-20260808-"));
        assert_eq!(code.as_str().len(), "RS-20260808-".len() + 6);
    }

    #[test]
    fn order_code_suffix_is_uppercase_hex() {
        let code = OrderCode::for_date(civil::date(2026, 8, 8));

        let suffix: String = code.as_str().chars().rev().take(6).collect();

        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
            "unexpected suffix in {code}"
        );
    }

    #[test]
    fn order_codes_are_unique() {
        let date = civil::date(2026, 8, 8);

        assert_ne!(OrderCode::for_date(date), OrderCode::for_date(date));
    }

    #[test]
    fn place_order_freezes_cart_and_clears_store() -> TestResult {
        let mut store = CartStore::open(MemorySlot::new(), CLP);

        store.add(&candidate("p1", 1000, 2));
        store.add(&candidate("p2", 500, 1));

        let order = place_order(&mut store, details(), Rates::new(0.19, 0.0)?)?;

        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.totals().subtotal(), Money::from_minor(2500, CLP));
        assert_eq!(order.totals().total(), Money::from_minor(2975, CLP));
        assert!(store.cart().is_empty());

        Ok(())
    }

    #[test]
    fn place_order_on_empty_cart_is_rejected() -> TestResult {
        let mut store = CartStore::open(MemorySlot::new(), CLP);

        let result = place_order(&mut store, details(), Rates::new(0.19, 0.0)?);

        assert!(matches!(result, Err(OrderError::EmptyCart)));

        Ok(())
    }

    #[test]
    fn place_order_clears_the_persisted_snapshot() -> TestResult {
        let slot = MemorySlot::new();
        let mut store = CartStore::open(slot.clone(), CLP);

        store.add(&candidate("p1", 1000, 1));

        let _order = place_order(&mut store, details(), Rates::default())?;

        assert_eq!(slot.read()?, Some("[]".to_string()));

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let mut store = CartStore::open(MemorySlot::new(), CLP);

        store.add(&candidate("p1", 1000, 2));

        let order = place_order(
            &mut store,
            details().with_notes("sin cebolla"),
            Rates::new(0.19, 0.0)?,
        )?;

        let mut rendered = Vec::new();

        order.write_to(&mut rendered)?;

        let rendered = String::from_utf8(rendered)?;

        assert!(rendered.contains("Product p1"));
        assert!(rendered.contains("Subtotal"));
        assert!(rendered.contains("sin cebolla"));
        assert!(rendered.contains(order.code().as_str()));

        Ok(())
    }
}
