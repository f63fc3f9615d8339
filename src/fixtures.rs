//! Fixtures

use std::{fs, path::Path};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::{Catalog, Product, ProductSize},
    money::Price,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: FxHashMap<String, ProductFixture>,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,

    /// Base price in minor units.
    price: u64,

    #[serde(default)]
    sizes: Vec<SizeFixture>,
}

#[derive(Debug, Deserialize)]
struct SizeFixture {
    name: String,

    #[serde(default)]
    diameter_cm: Option<u32>,

    #[serde(default)]
    price_modifier: i64,
}

impl From<SizeFixture> for ProductSize {
    fn from(fixture: SizeFixture) -> Self {
        match fixture.diameter_cm {
            Some(diameter) => {
                ProductSize::with_diameter(fixture.name, diameter, fixture.price_modifier)
            }
            None => ProductSize::new(fixture.name, fixture.price_modifier),
        }
    }
}

/// Parses a catalogue from YAML text.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the text is not valid catalogue YAML.
pub fn parse_catalog(yaml: &str) -> Result<Catalog, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(yaml)?;
    let mut catalog = Catalog::new();

    for (id, product_fixture) in fixture.products {
        let sizes = product_fixture
            .sizes
            .into_iter()
            .map(ProductSize::from)
            .collect();

        let product = Product::with_sizes(
            product_fixture.name,
            Price::from_minor(product_fixture.price),
            sizes,
        );

        catalog.insert(id, product);
    }

    Ok(catalog)
}

/// Loads a catalogue fixture from a YAML file.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the file cannot be read or parsed.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, FixtureError> {
    let contents = fs::read_to_string(path)?;

    parse_catalog(&contents)
}
