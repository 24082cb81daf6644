mod app;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::{Arc, Mutex},
};

use rocketshoes_core::{
    config::{self, AppConfig},
    CartStore, FileStore, HttpInventoryClient,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "starting");

    let inventory = HttpInventoryClient::from_config(&config)?;
    let storage = FileStore::new(&config.data_dir);
    let (notify_tx, notify_rx) = mpsc::unbounded_channel();
    let store = CartStore::new(inventory, storage, notify_tx).with_context(|| {
        format!("failed to load saved cart from {}", config.data_dir.display())
    })?;

    let mut app = app::CartApp::new(Arc::new(store), config.api_url.clone());
    app.attach_notifications(notify_rx);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("rocketshoes.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal UI owns stdout, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
