#![warn(clippy::all, missing_docs)]

//! Core domain logic for the RocketShoes cart client.
//!
//! This crate hosts the product models, configuration handling, the
//! inventory client, local persistence and the cart store used by the
//! terminal UI and any future frontends.

pub mod cart;
pub mod config;
pub mod inventory;
pub mod models;
pub mod notify;
pub mod storage;

pub use cart::{CartError, CartOperation, CartStore, CART_STORAGE_KEY};
pub use config::AppConfig;
pub use inventory::{HttpInventoryClient, InventoryClient, InventoryError};
pub use models::{CatalogProduct, Product, ProductId, Stock, UpdateProductAmount};
pub use notify::{Notification, NotificationLevel, Notifier, NullNotifier};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
