//! Offline-First Customer Client
//!
//! Everything that runs on the device: local storage, the sync queue, the
//! remote store adapters and the engine tying them together.
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── config.rs    - Configuration (server URL, API key, token, data dir)
//! ├── enrich.rs    - Author profile enrichment
//! ├── local_db/    - SQLite-backed replica and metadata
//! ├── offline/     - Sync queue, optimistic edits, replay reconciliation
//! ├── remote/      - Remote store trait, HTTP and in-memory adapters
//! ├── sync/        - Sync engine, connectivity monitor, replay trigger
//! └── main.rs      - Sync daemon entry point (binary)
//! ```

pub mod config;
pub mod enrich;
pub mod local_db;
pub mod offline;
pub mod remote;
pub mod sync;

// Re-export commonly used types
pub use config::Config;
pub use enrich::ProfileEnricher;
pub use local_db::LocalDatabase;
pub use remote::{HttpRemote, MemoryRemote, RemoteStore};
pub use sync::{ConnectivityMonitor, ReplayReport, ReplayTrigger, SyncEngine, SyncOptions, WriteOutcome};
