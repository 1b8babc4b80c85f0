//! # Sync Engine
//!
//! Offline-first access to the customer collection. Every mutation either
//! reaches the authoritative store immediately or is applied to the local
//! replica and queued, and queued mutations are replayed once connectivity
//! returns.
//!
//! ## Architecture
//!
//! - **Engine** (`engine.rs`): create/update/delete/fetch_all/replay
//! - **Network Monitor**: reachability signal with change notification
//! - **Background** (`background.rs`): replays on every Offline→Online
//!   transition
//! - **Sync State / Metrics**: status snapshots and per-pass replay reports
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use geoledger::client::local_db::LocalDatabase;
//! use geoledger::client::remote::MemoryRemote;
//! use geoledger::client::sync::{SyncEngine, SyncOptions};
//! use geoledger::shared::CustomerPayload;
//!
//! # async fn example() -> geoledger::shared::SyncResult<()> {
//! let db = Arc::new(LocalDatabase::in_memory().await?);
//! let engine = SyncEngine::new(db, Arc::new(MemoryRemote::new()), SyncOptions::default());
//!
//! let payload = CustomerPayload::named("Acme")
//!     .with_location(30.04, 31.23);
//! let outcome = engine.create(payload, false, "Alice").await;
//! // Offline: validation fails here or the create is queued
//! let report = engine.replay(true).await?;
//! println!("replayed {} of {}", report.replayed, report.attempted);
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod engine;
pub mod metrics;
pub mod network_monitor;
pub mod sync_state;

pub use background::ReplayTrigger;
pub use engine::{SyncEngine, WriteOutcome};
pub use metrics::ReplayReport;
pub use network_monitor::{spawn_http_probe, ConnectivityMonitor, NetworkStatus, SubscriptionId};
pub use sync_state::SyncStatus;

use std::time::Duration;

use crate::client::config::Config;
use crate::client::local_db::CUSTOMERS_KEY;
use crate::shared::config::DEFAULT_REQUEST_TIMEOUT_MS;

/// Engine settings
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Upper bound on every remote call; elapsing counts as a remote failure
    pub request_timeout: Duration,
    /// Replica key the customer snapshot is stored under
    pub collection_key: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            collection_key: CUSTOMERS_KEY.to_string(),
        }
    }
}

impl SyncOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
