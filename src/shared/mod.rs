//! Shared Module
//!
//! Plain data types used by every layer of the client: the customer record
//! and its payloads, entity identifiers, author profiles, configuration and
//! error types. Everything here is serializable and free of I/O.

/// Customer record and partial payloads
pub mod customer;

/// Server and temporary entity identifiers
pub mod identity;

/// Author profiles and the signed-in actor
pub mod profile;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use customer::{Customer, CustomerPayload};
pub use identity::EntityId;
pub use profile::{Actor, AuthorProfile};
pub use error::{RemoteError, SyncError, SyncResult};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
