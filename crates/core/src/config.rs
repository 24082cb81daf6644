//! Application configuration.
//!
//! Values are layered: built-in defaults, then `config.toml` under the user's
//! config directory, then `ROCKETSHOES_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under `~/.config` holding configuration and stored data.
pub const APP_DIR: &str = "rocketshoes";
/// Default inventory API location (a local `json-server` instance).
pub const DEFAULT_API_URL: &str = "http://localhost:3333";
/// Default per-request timeout for inventory calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "ROCKETSHOES";

const DEFAULT_CONFIG: &str = r#"# RocketShoes client configuration.

# Base URL of the product/stock API.
api_url = "http://localhost:3333"

# Seconds to wait for an inventory response before giving up.
request_timeout_secs = 30

# Directory holding the persisted cart. Defaults to the `storage` folder next
# to this file.
# data_dir = "/path/to/storage"
"#;

/// Runtime configuration for the cart client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the product/stock API.
    pub api_url: String,
    /// Timeout applied to each inventory request.
    pub request_timeout_secs: u64,
    /// Directory backing the local key-value store.
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: config_root().join("storage"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration using `path` as the file layer. A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_sources(path.as_ref(), Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(path: &Path, environment: Environment) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
            .add_source(File::from(path).required(false))
            .add_source(environment)
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let mut config: Self = settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Timeout for a single inventory request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Root directory for configuration files.
pub fn config_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Path of the user configuration file.
pub fn config_path() -> PathBuf {
    config_root().join(CONFIG_FILE)
}

/// Write the default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path())
}

fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}
