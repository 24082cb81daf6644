//! Shared domain models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Numeric identifier shared by catalog products and stock records.
pub type ProductId = u64;

/// A product as served by the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price as published by the catalog.
    pub price: f64,
    /// Image URL.
    pub image: String,
    /// Any further catalog fields, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An entry in the cart: the catalog record plus the quantity held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price as published by the catalog.
    pub price: f64,
    /// Image URL.
    pub image: String,
    /// Quantity of this product in the cart. Always at least one.
    pub amount: u32,
    /// Any further catalog fields, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Build a cart entry from a catalog record.
    pub fn from_catalog(product: CatalogProduct, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
            extra: product.extra,
        }
    }

    /// Copy of this entry holding a different amount.
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}

/// Inventory record for a single product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product identifier.
    pub id: ProductId,
    /// Units available. Inventory feeds may report negative levels.
    pub amount: i64,
}

/// Arguments for setting an absolute cart quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    /// Product to update.
    pub product_id: ProductId,
    /// Desired quantity. Values of zero or below are ignored.
    pub amount: i64,
}
