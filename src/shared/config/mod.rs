//! Application configuration module
//!
//! Provides the configuration values the sync client needs: where the
//! authoritative store lives, how long a remote call may take, where local
//! data is kept and how often reachability is probed.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default timeout applied to every remote call
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default interval between reachability probes
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 15;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the authoritative store
    pub server_url: Option<String>,
    /// Public API key sent with every remote request
    pub api_key: Option<String>,
    /// Directory holding the local database
    pub data_dir: Option<PathBuf>,
    /// Remote call timeout in milliseconds
    pub request_timeout_ms: Option<u64>,
    /// Reachability probe interval in seconds
    pub probe_interval_secs: Option<u64>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::MissingValue("request_timeout_ms"));
        }
        Ok(())
    }

    /// Remote call timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    /// Reachability probe interval
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.unwrap_or(DEFAULT_PROBE_INTERVAL_SECS))
    }

    /// Overlay every value set in `other` on top of this configuration
    pub fn merge(mut self, other: AppConfig) -> Self {
        if other.server_url.is_some() {
            self.server_url = other.server_url;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.request_timeout_ms.is_some() {
            self.request_timeout_ms = other.request_timeout_ms;
        }
        if other.probe_interval_secs.is_some() {
            self.probe_interval_secs = other.probe_interval_secs;
        }
        self
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    inner: AppConfig,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.inner.server_url = Some(url.into());
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.inner.api_key = Some(key.into());
        self
    }

    /// Set the local data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.data_dir = Some(dir.into());
        self
    }

    /// Set the remote call timeout
    pub fn request_timeout_ms(mut self, millis: u64) -> Self {
        self.inner.request_timeout_ms = Some(millis);
        self
    }

    /// Set the reachability probe interval
    pub fn probe_interval_secs(mut self, secs: u64) -> Self {
        self.inner.probe_interval_secs = Some(secs);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid config file: {0}")]
    Parse(String),
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
}
