//! Application configuration
//!
//! Loaded from a TOML file (`~/.config/ampay-checkout/config.toml` by
//! default). Every section falls back to sensible defaults when absent,
//! so a missing file is not fatal.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub public: PublicSettings,
    pub poller: PollerSettings,
    pub locale: LocaleSettings,
    pub logging: LoggingSettings,
}

/// `[api]` section: how to reach the charging backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the checkout backend.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

/// `[public]` section: where the payment provider sends the user back to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublicSettings {
    /// Public base URL used to build the success/cancel redirect URLs.
    pub base_url: String,
}

impl Default for PublicSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// `[poller]` section: session polling cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    /// Seconds between polls while the session is charging.
    pub poll_interval_secs: u64,
    /// Seconds between retries while the transaction has not started yet.
    pub retry_delay_secs: u64,
    /// How many not-yet-started polls are tolerated before giving up.
    pub max_not_found_retries: u32,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            retry_delay_secs: 5,
            max_not_found_retries: 3,
        }
    }
}

/// `[locale]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocaleSettings {
    /// Fixed UI language (`en`, `de`). Autodetected from the environment
    /// when unset.
    pub language: Option<String>,
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default log level filter; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides on top of the loaded file. `lookup`
    /// abstracts `std::env::var` so the overrides stay testable.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("AMPAY_API_URL") {
            self.api.base_url = url;
        }
        if let Some(url) = lookup("AMPAY_PUBLIC_URL") {
            self.public.base_url = url;
        }
        if let Some(language) = lookup("AMPAY_LANGUAGE") {
            self.locale.language = Some(language);
        }
    }
}

/// Default configuration file location (`~/.config/ampay-checkout/config.toml`).
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ampay-checkout")
        .join("config.toml")
}

// ── Tests ──────────────────────────────────────────────────────────────
