use thiserror::Error;

use crate::{inventory::InventoryError, models::ProductId, storage::StorageError};

/// Message shown whenever a requested quantity exceeds the available stock.
pub const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

/// The cart operation an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    /// Adding one unit of a product.
    Add,
    /// Dropping a product from the cart.
    Remove,
    /// Setting an absolute quantity.
    Update,
}

impl CartOperation {
    /// Generic failure message for this operation.
    pub fn failure_message(self) -> &'static str {
        match self {
            CartOperation::Add => "Error adding product",
            CartOperation::Remove => "Error removing product",
            CartOperation::Update => "Error updating product amount",
        }
    }
}

/// Why a cart operation did not commit.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity is more than the inventory holds.
    #[error("requested {requested} of product {product_id} but only {available} in stock")]
    OutOfStock {
        /// Product being changed.
        product_id: ProductId,
        /// Quantity the operation would have left in the cart.
        requested: u64,
        /// Units in stock.
        available: i64,
    },
    /// The operation needs an existing cart entry and there is none.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
    /// Looking up stock or catalog data failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    /// Writing the cart to storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Text shown to the user when `operation` fails with this error.
    ///
    /// Only stock violations get a dedicated message; every other kind
    /// collapses into the operation's generic failure.
    pub fn user_message(&self, operation: CartOperation) -> &'static str {
        match self {
            CartError::OutOfStock { .. } => OUT_OF_STOCK_MESSAGE,
            _ => operation.failure_message(),
        }
    }
}
