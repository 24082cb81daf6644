use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::AppConfig,
    models::{CatalogProduct, ProductId, Stock},
};

use super::{InventoryClient, InventoryError};

/// Inventory client speaking to a `json-server` style REST API.
///
/// Stock lives under `/stock/{id}` and catalog records under `/products/{id}`.
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInventoryClient {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an already configured `reqwest` client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Build a client from application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout())
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, InventoryError> {
        let url = self.url(path);
        debug!(%url, "inventory request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| InventoryError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound { url });
        }
        if !status.is_success() {
            return Err(InventoryError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| InventoryError::Transport {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| InventoryError::Decode { url, source })
    }
}

impl InventoryClient for HttpInventoryClient {
    async fn get_stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        self.get_json(&format!("stock/{id}")).await
    }

    async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, InventoryError> {
        self.get_json(&format!("products/{id}")).await
    }

    async fn list_products(&self) -> Result<Vec<CatalogProduct>, InventoryError> {
        self.get_json("products").await
    }
}
