/**
 * geoledger Sync Daemon - Main Entry Point
 *
 * Keeps the local customer replica in step with the remote store: probes
 * reachability and replays queued changes whenever the store comes back.
 *
 * Usage: geoledger-sync [config.toml]
 */
use std::sync::Arc;

use geoledger::client::sync::{spawn_http_probe, ConnectivityMonitor, NetworkStatus};
use geoledger::client::{Config, HttpRemote, LocalDatabase, ReplayTrigger, SyncEngine, SyncOptions};

/// Environment variable naming a TOML config file
const ENV_CONFIG_PATH: &str = "GEOLEDGER_CONFIG";

fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok());

    let config = match path {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            Config::load(&path)?.with_env_overrides()?
        }
        None => Config::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = load_config()?;
    let db_path = config.database_path();
    tracing::info!(
        "Syncing with {} (local store {})",
        config.server_url(),
        db_path.display()
    );

    let db = Arc::new(LocalDatabase::open(&db_path).await?);
    let remote = Arc::new(HttpRemote::new(config.clone())?);
    let engine = Arc::new(SyncEngine::new(
        db.clone(),
        remote,
        SyncOptions::from_config(&config),
    ));

    let pending = engine.queue().len().await?;
    if pending > 0 {
        tracing::info!("{} changes queued from a previous session", pending);
    }

    // Starts offline; the first successful probe triggers a replay
    let monitor = Arc::new(ConnectivityMonitor::new(NetworkStatus::Offline));
    let trigger = ReplayTrigger::spawn(engine.clone(), &monitor);
    let probe = spawn_http_probe(
        monitor.clone(),
        config.api_url("/rest/v1/"),
        config.probe_interval(),
        config.request_timeout(),
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    probe.abort();
    trigger.stop();

    let status = engine.status(monitor.is_online()).await?;
    let stats = db.get_stats().await?;
    tracing::info!(
        "{} customers stored locally, {} changes still queued",
        stats.customer_count,
        status.pending_intents
    );
    Ok(())
}
