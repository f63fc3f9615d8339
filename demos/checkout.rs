//! Checkout Example
//!
//! Builds a cart from the bundled menu fixture, merges a repeated addition,
//! and prints the finalized order summary.
//!
//! Use `-c` to load a different catalogue fixture file
//! Use `-t` / `-d` to change the fractional tax and discount rates
//! Use `-s` to persist the cart snapshot to a file in between runs

use std::{io, num::NonZeroU32};

use anyhow::{Context, Result};
use clap::Parser;
use rusty_money::iso::CLP;
use trolley::{
    catalog::Catalog,
    fixtures,
    receipt::{CustomerDetails, PaymentMethod, place_order},
    snapshot::{FileSlot, MemorySlot, SnapshotSlot},
    store::CartStore,
    totals::Rates,
    utils::ExampleCheckoutArgs,
};

pub fn main() -> Result<()> {
    let args = ExampleCheckoutArgs::parse();

    let catalog = fixtures::load_catalog(&args.catalog)?;
    let rates = Rates::new(args.tax_rate, args.discount_rate)?;

    match args.slot.as_deref() {
        Some(path) => checkout(CartStore::open(FileSlot::new(path), CLP), &catalog, rates),
        None => checkout(CartStore::open(MemorySlot::new(), CLP), &catalog, rates),
    }
}

fn checkout<S: SnapshotSlot>(
    mut store: CartStore<S>,
    catalog: &Catalog,
    rates: Rates,
) -> Result<()> {
    let one = NonZeroU32::MIN;
    let two = NonZeroU32::new(2).context("literal quantity is non-zero")?;

    store.add(&catalog.candidate("margarita", Some("Familiar"), two)?);
    store.add(&catalog.candidate("pepperoni", Some("Mediana"), one)?);
    store.add(&catalog.candidate("bebida", None, one)?);

    // Same product and size as before, so this folds into the existing line.
    store.add(&catalog.candidate("margarita", Some("Familiar"), one)?);

    let details = CustomerDetails::new(
        "Ada Lovelace",
        "987654321",
        "Av. Siempre Viva 742",
        PaymentMethod::Cash,
    )
    .with_notes("sin cebolla");

    let order = place_order(&mut store, details, rates)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    order.write_to(&mut handle)?;

    Ok(())
}
