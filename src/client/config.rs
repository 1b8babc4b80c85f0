use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:54321";

/// Environment variables read by `Config::from_env`
pub const ENV_API_URL: &str = "CLIENT_API_URL";
pub const ENV_API_KEY: &str = "CLIENT_API_KEY";
pub const ENV_DATA_DIR: &str = "GEOLEDGER_DATA_DIR";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "GEOLEDGER_REQUEST_TIMEOUT_MS";
pub const ENV_PROBE_INTERVAL_SECS: &str = "GEOLEDGER_PROBE_INTERVAL_SECS";

/// Client configuration wrapper.
#[derive(Debug, Clone, Default)]
pub struct Config {
    app: AppConfig,
    token: Option<String>,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self {
            app: builder.build()?,
            token: None,
        })
    }

    /// Parse a TOML configuration document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            app: AppConfig::from_toml_str(source)?,
            token: None,
        })
    }

    /// Read a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Values set in the environment
    ///
    /// Unset variables stay unset, so the result can be merged over a file.
    pub fn env_overrides() -> Result<AppConfig, ConfigError> {
        let mut builder = AppConfig::builder();
        if let Ok(url) = std::env::var(ENV_API_URL) {
            builder = builder.server_url(url);
        }
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            builder = builder.api_key(key);
        }
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            builder = builder.data_dir(dir);
        }
        if let Ok(raw) = std::env::var(ENV_REQUEST_TIMEOUT_MS) {
            builder = builder.request_timeout_ms(parse_number(ENV_REQUEST_TIMEOUT_MS, &raw)?);
        }
        if let Ok(raw) = std::env::var(ENV_PROBE_INTERVAL_SECS) {
            builder = builder.probe_interval_secs(parse_number(ENV_PROBE_INTERVAL_SECS, &raw)?);
        }
        builder.build()
    }

    /// Configuration from the environment alone
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            app: Self::env_overrides()?,
            token: None,
        })
    }

    /// Apply environment overrides on top of this configuration
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        self.app = self.app.merge(Self::env_overrides()?);
        Ok(self)
    }

    /// Set the access token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the access token
    pub fn get_token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    /// Clear the token (logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url().trim_end_matches('/'), path)
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.app.api_key.as_deref()
    }

    /// Bearer credential: the session token, else the public API key
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref().or_else(|| self.api_key())
    }

    /// Directory holding the local database, if configured
    pub fn data_dir(&self) -> Option<&Path> {
        self.app.data_dir.as_deref()
    }

    /// Local database file
    pub fn database_path(&self) -> PathBuf {
        crate::client::local_db::LocalDatabase::path_in(self.data_dir())
    }

    pub fn request_timeout(&self) -> Duration {
        self.app.request_timeout()
    }

    pub fn probe_interval(&self) -> Duration {
        self.app.probe_interval()
    }
}

fn parse_number(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Parse(format!("{} must be a number, got '{}'", var, raw)))
}
