//! Remote product and stock lookups.

/// REST client for the product/stock API.
pub mod http;

use std::{future::Future, sync::Arc};

use thiserror::Error;

use crate::models::{CatalogProduct, ProductId, Stock};

pub use http::HttpInventoryClient;

/// Failures while talking to the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The request never produced a response (connection, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The service has no record at `url`.
    #[error("{url} not found")]
    NotFound {
        /// Requested URL.
        url: String,
    },
    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The response body did not match the expected shape.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Read access to the product catalog and stock levels.
pub trait InventoryClient: Send + Sync {
    /// Fetch the stock record for `id`.
    fn get_stock(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Stock, InventoryError>> + Send;

    /// Fetch the catalog record for `id`.
    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, InventoryError>> + Send;

    /// Fetch the whole catalog.
    fn list_products(
        &self,
    ) -> impl Future<Output = Result<Vec<CatalogProduct>, InventoryError>> + Send;
}

impl<T: InventoryClient> InventoryClient for Arc<T> {
    fn get_stock(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Stock, InventoryError>> + Send {
        (**self).get_stock(id)
    }

    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, InventoryError>> + Send {
        (**self).get_product(id)
    }

    fn list_products(
        &self,
    ) -> impl Future<Output = Result<Vec<CatalogProduct>, InventoryError>> + Send {
        (**self).list_products()
    }
}
