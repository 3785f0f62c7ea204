//! # Till Configuration
//!
//! Where the backend lives, how long to wait for it, and how to present
//! amounts.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     TILL_API_URL=https://pos.example.com                                │
//! │     TILL_API_TOKEN=...                                                  │
//! │     TILL_TIMEOUT_MS=5000                                                │
//! │     TILL_STORE_NAME="Downtown Branch"                                   │
//! │     TILL_CURRENCY=Ksh                                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     --config PATH, or                                                   │
//! │     ~/.config/till/till.toml (Linux)                                    │
//! │     ~/Library/Application Support/com.till.till/till.toml (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     http://localhost:5000, 5 s timeout, Ksh                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # till.toml
//! [api]
//! base_url = "http://localhost:5000"
//! token = "eyJhbGciOi..."
//! timeout_ms = 5000
//!
//! [store]
//! name = "Downtown Branch"
//! currency = "Ksh"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Name of the config file inside the project config directory.
pub const CONFIG_FILE_NAME: &str = "till.toml";

// =============================================================================
// API Settings
// =============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the backend; `/products` and `/sales` are resolved
    /// against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request when present.
    #[serde(default)]
    pub token: Option<String>,

    /// Upper bound for a single collaborator call (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            token: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// Presentation settings for the store running this till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Human-readable store name, printed on receipts.
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Currency symbol used when formatting amounts.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_store_name() -> String {
    "Till".to_string()
}

fn default_currency() -> String {
    till_core::DEFAULT_CURRENCY.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency: default_currency(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete till configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TillConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl TillConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (till.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading till config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Till config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        self.base_url()?;

        if self.api.timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        if self.store.currency.trim().is_empty() {
            return Err(ClientError::InvalidConfig("currency must not be empty".into()));
        }

        Ok(())
    }

    /// Applies `TILL_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary key lookup.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("TILL_API_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.api.base_url = url;
        }

        if let Some(token) = lookup("TILL_API_TOKEN") {
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }

        if let Some(timeout) = lookup("TILL_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => {
                    debug!(timeout_ms = ms, "Overriding request timeout from environment");
                    self.api.timeout_ms = ms;
                }
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric TILL_TIMEOUT_MS"),
            }
        }

        if let Some(name) = lookup("TILL_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(currency) = lookup("TILL_CURRENCY") {
            self.store.currency = currency;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "till", "till")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Parses the backend base URL, requiring an http(s) scheme.
    ///
    /// A trailing slash is added if missing so that relative joins keep any
    /// path prefix (`https://host/api` + `products` = `https://host/api/products`).
    pub fn base_url(&self) -> ClientResult<Url> {
        let mut raw = self.api.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }

        let url = Url::parse(&raw)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ClientError::InvalidUrl(format!(
                "Backend URL must use http or https, got: {}",
                other
            ))),
        }
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    pub fn token(&self) -> Option<&str> {
        self.api.token.as_deref()
    }

    pub fn currency(&self) -> &str {
        &self.store.currency
    }
}
