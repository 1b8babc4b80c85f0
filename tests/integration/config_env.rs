//! Environment-driven configuration
//!
//! These tests mutate process environment variables and run serially.

use crate::{assert_err, assert_ok};
use geoledger::client::config::{
    ENV_API_KEY, ENV_API_URL, ENV_DATA_DIR, ENV_PROBE_INTERVAL_SECS, ENV_REQUEST_TIMEOUT_MS,
};
use geoledger::client::Config;
use geoledger::shared::ConfigError;
use serial_test::serial;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

const ALL_VARS: [&str; 5] = [
    ENV_API_URL,
    ENV_API_KEY,
    ENV_DATA_DIR,
    ENV_REQUEST_TIMEOUT_MS,
    ENV_PROBE_INTERVAL_SECS,
];

fn clear_env() {
    for var in ALL_VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn reads_every_variable() {
    clear_env();
    std::env::set_var(ENV_API_URL, "https://abc.supabase.co");
    std::env::set_var(ENV_API_KEY, "anon");
    std::env::set_var(ENV_DATA_DIR, "/var/lib/geoledger");
    std::env::set_var(ENV_REQUEST_TIMEOUT_MS, "1500");
    std::env::set_var(ENV_PROBE_INTERVAL_SECS, "5");

    let config = assert_ok!(Config::from_env());
    clear_env();

    assert_eq!(config.server_url(), "https://abc.supabase.co");
    assert_eq!(config.api_key(), Some("anon"));
    assert_eq!(config.bearer(), Some("anon"));
    assert_eq!(config.data_dir(), Some(Path::new("/var/lib/geoledger")));
    assert_eq!(config.request_timeout(), Duration::from_millis(1500));
    assert_eq!(config.probe_interval(), Duration::from_secs(5));
}

#[test]
#[serial]
fn rejects_non_numeric_timeout() {
    clear_env();
    std::env::set_var(ENV_REQUEST_TIMEOUT_MS, "fast");

    let result = Config::from_env();
    clear_env();

    assert_err!(result, ConfigError::Parse(_));
}

#[test]
#[serial]
fn rejects_non_http_url() {
    clear_env();
    std::env::set_var(ENV_API_URL, "ftp://files.example.com");

    let result = Config::from_env();
    clear_env();

    assert_err!(result, ConfigError::InvalidUrl(_));
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    clear_env();
    let mut file = assert_ok!(tempfile::NamedTempFile::new());
    assert_ok!(writeln!(
        file,
        "server_url = \"https://file.example.com\"\nrequest_timeout_ms = 4000\nprobe_interval_secs = 30"
    ));
    std::env::set_var(ENV_REQUEST_TIMEOUT_MS, "250");

    let config = assert_ok!(Config::load(file.path()).and_then(Config::with_env_overrides));
    clear_env();

    assert_eq!(config.server_url(), "https://file.example.com");
    assert_eq!(config.request_timeout(), Duration::from_millis(250));
    assert_eq!(config.probe_interval(), Duration::from_secs(30));
}

#[test]
#[serial]
fn missing_file_is_an_io_error() {
    clear_env();
    assert_err!(
        Config::load("/nonexistent/geoledger.toml"),
        ConfigError::Io(_)
    );
}
