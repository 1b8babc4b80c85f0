//! geoledger - Offline-First Customer Sync
//!
//! Client library for tracking customers with a pinned location against a
//! remote authoritative store, keeping the client fully usable while
//! disconnected.
//!
//! # Overview
//!
//! - Reads and writes go to the remote store when it is reachable and are
//!   written through to a local SQLite replica
//! - While unreachable, writes are applied to the replica and recorded in a
//!   durable sync queue
//! - When connectivity returns the queue is replayed in order, temporary ids
//!   are rewritten to server ids and the collection is refetched
//!
//! # Module Structure
//!
//! - **`shared`** - Domain types, identifiers, errors and configuration
//! - **`client`** - Local storage, sync queue, remote adapters and the engine
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use geoledger::client::{Config, HttpRemote, LocalDatabase, SyncEngine, SyncOptions};
//! use geoledger::shared::Actor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let db = Arc::new(LocalDatabase::open(config.database_path()).await?);
//! let remote = Arc::new(HttpRemote::new(config.clone())?);
//! let engine = SyncEngine::new(db, remote, SyncOptions::from_config(&config));
//!
//! let me = Actor::new("user-id", false);
//! let customers = engine.fetch_all(true, Some(&me)).await?;
//! # let _ = customers;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::error::SyncError` for local failures, returned to the caller
//! - `shared::error::RemoteError` for remote failures, which the engine turns
//!   into queued outcomes instead of errors

/// Shared types and data structures
pub mod shared;

/// Device-side storage, sync queue and engine
pub mod client;
