//! Products

use std::num::NonZeroU32;

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::{lines::Candidate, money::Price};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Errors looking up products or resolving unit prices.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Size not found on the product
    #[error("Size {size} not found on product {product}")]
    SizeNotFound {
        /// Product whose sizes were searched.
        product: String,
        /// The requested size label.
        size: String,
    },

    /// Size modifier drives the unit price out of range
    #[error("Invalid price for product {0}: size modifier drives the unit price out of range")]
    InvalidPrice(String),
}

/// A size option for a product: a label plus a price modifier applied on
/// top of the product's base price. Modifiers may be negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSize {
    name: String,
    diameter_cm: Option<u32>,
    price_modifier: i64,
}

impl ProductSize {
    /// Creates a size option.
    pub fn new(name: impl Into<String>, price_modifier: i64) -> Self {
        Self {
            name: name.into(),
            diameter_cm: None,
            price_modifier,
        }
    }

    /// Creates a size option with a diameter, for products measured in cm.
    pub fn with_diameter(name: impl Into<String>, diameter_cm: u32, price_modifier: i64) -> Self {
        Self {
            name: name.into(),
            diameter_cm: Some(diameter_cm),
            price_modifier,
        }
    }

    /// Returns the size label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the diameter in centimetres, if the product is measured.
    #[must_use]
    pub fn diameter_cm(&self) -> Option<u32> {
        self.diameter_cm
    }

    /// Returns the price modifier in minor units.
    #[must_use]
    pub fn price_modifier(&self) -> i64 {
        self.price_modifier
    }
}

/// A catalogue product with a base price and optional size options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    name: String,
    base_price: Price,
    sizes: Vec<ProductSize>,
}

impl Product {
    /// Creates a product without size options.
    pub fn new(name: impl Into<String>, base_price: Price) -> Self {
        Self::with_sizes(name, base_price, Vec::new())
    }

    /// Creates a product with size options.
    pub fn with_sizes(name: impl Into<String>, base_price: Price, sizes: Vec<ProductSize>) -> Self {
        Self {
            name: name.into(),
            base_price,
            sizes,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the base price.
    #[must_use]
    pub fn base_price(&self) -> Price {
        self.base_price
    }

    /// Returns the size options.
    #[must_use]
    pub fn sizes(&self) -> &[ProductSize] {
        &self.sizes
    }

    /// Looks up a size option by label.
    #[must_use]
    pub fn size(&self, name: &str) -> Option<&ProductSize> {
        self.sizes.iter().find(|size| size.name == name)
    }
}

/// Product catalogue, keyed by generated keys with a string-id lookup map.
#[derive(Debug, Default)]
pub struct Catalog {
    products: SlotMap<ProductKey, Product>,
    product_keys: FxHashMap<String, ProductKey>,
}

impl Catalog {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a product under a string id, replacing any previous entry.
    pub fn insert(&mut self, id: impl Into<String>, product: Product) -> ProductKey {
        let key = self.products.insert(product);

        if let Some(previous) = self.product_keys.insert(id.into(), key) {
            self.products.remove(previous);
        }

        key
    }

    /// Gets a product by its string id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product, CatalogError> {
        let key = self.product_key(id)?;

        self.products
            .get(key)
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))
    }

    /// Gets a product key by its string id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if the product is not found.
    pub fn product_key(&self, id: &str) -> Result<ProductKey, CatalogError> {
        self.product_keys
            .get(id)
            .copied()
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))
    }

    /// Gets a product by its generated key.
    #[must_use]
    pub fn get(&self, key: ProductKey) -> Option<&Product> {
        self.products.get(key)
    }

    /// Returns the number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Checks whether the catalogue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Resolves the unit price for a product and optional size: the base
    /// price plus the chosen size's modifier.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the product or size is not found, or
    /// if the modifier drives the price out of range.
    pub fn unit_price(&self, id: &str, size: Option<&str>) -> Result<Price, CatalogError> {
        let product = self.product(id)?;

        let modifier = match size {
            None => 0,
            Some(label) => product
                .size(label)
                .ok_or_else(|| CatalogError::SizeNotFound {
                    product: id.to_string(),
                    size: label.to_string(),
                })?
                .price_modifier,
        };

        let Ok(base) = i64::try_from(product.base_price.minor_units()) else {
            return Err(CatalogError::InvalidPrice(id.to_string()));
        };

        let minor = base
            .checked_add(modifier)
            .and_then(|value| u64::try_from(value).ok())
            .ok_or_else(|| CatalogError::InvalidPrice(id.to_string()))?;

        Ok(Price::from_minor(minor))
    }

    /// Builds an add candidate for the cart store, snapshotting the
    /// product's name and the unit price for the chosen size.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the product or size is not found, or
    /// if the unit price cannot be resolved.
    pub fn candidate(
        &self,
        id: &str,
        size: Option<&str>,
        quantity: NonZeroU32,
    ) -> Result<Candidate, CatalogError> {
        let unit_price = self.unit_price(id, size)?;
        let product = self.product(id)?;

        Ok(Candidate {
            product_id: id.to_string(),
            name: product.name.clone(),
            size: size.map(ToString::to_string),
            unit_price,
            quantity,
        })
    }
}
