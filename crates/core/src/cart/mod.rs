//! Cart state, its persistence and stock validation.

mod error;
/// The cart store and its operations.
pub mod store;

pub use error::{CartError, CartOperation, OUT_OF_STOCK_MESSAGE};
pub use store::{CartStore, CART_STORAGE_KEY};
