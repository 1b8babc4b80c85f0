//! # Offline Support
//!
//! Building blocks the sync engine uses while the authoritative store is
//! unreachable or refuses a write.
//!
//! ## Key Components
//!
//! - `queue.rs`: durable FIFO of pending intents (`SyncQueue`)
//! - `optimistic.rs`: in-memory edits of the replica snapshot
//! - `reconciliation.rs`: temp id rewriting and ordering during replay

pub mod optimistic;
pub mod queue;
pub mod reconciliation;

// Re-export main types
pub use optimistic::OptimisticReplica;
pub use queue::{IntentKind, QueuedIntent, SyncIntent, SyncQueue, SYNC_QUEUE_KEY};
pub use reconciliation::{DeferReason, Disposition, IdMap, ReplayPass};
