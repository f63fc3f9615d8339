//! Utils

use clap::Parser;

/// Arguments for the checkout example
#[derive(Debug, Parser)]
pub struct ExampleCheckoutArgs {
    /// Catalogue fixture file to load the menu from
    #[clap(short, long, default_value = "fixtures/menu.yml")]
    pub catalog: String,

    /// Fractional tax rate applied at checkout
    #[clap(short, long, default_value_t = 0.19)]
    pub tax_rate: f64,

    /// Fractional discount rate applied at checkout
    #[clap(short, long, default_value_t = 0.0)]
    pub discount_rate: f64,

    /// Optional file to persist the cart snapshot in between runs
    #[clap(short, long)]
    pub slot: Option<String>,
}
