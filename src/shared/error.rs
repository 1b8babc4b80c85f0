//! Shared Error Types
//!
//! This module defines the two error families used by the sync engine.
//!
//! # Error Categories
//!
//! - `RemoteError` - failures talking to the authoritative store. These are
//!   always recoverable: the engine converts them into queued outcomes.
//! - `SyncError` - failures below the engine (local storage, serialization)
//!   or rejected local input. These propagate to the caller because there is
//!   no fallback underneath local storage.
//!
//! # Usage
//!
//! ```rust
//! use geoledger::shared::error::SyncError;
//!
//! let error = SyncError::validation("name", "Customer name is required");
//! assert!(error.to_string().contains("name"));
//! ```
use thiserror::Error;

/// Result alias for engine operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of a call against the remote authoritative store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Network unreachable, connection reset, DNS failure
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },

    /// The call did not complete within the configured request timeout
    #[error("Remote call timed out after {millis} ms")]
    Timeout {
        /// Timeout that elapsed
        millis: u64,
    },

    /// The remote store answered but refused the request
    #[error("Remote store rejected request ({status}): {message}")]
    Rejected {
        /// HTTP-equivalent status code
        status: u16,
        /// Body or reason returned by the store
        message: String,
    },

    /// The remote store answered with a body we could not decode
    #[error("Unexpected remote response: {message}")]
    Decode {
        /// Human-readable error message
        message: String,
    },
}

impl RemoteError {
    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new rejection error
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Create a new decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::rejected(status.as_u16(), err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

/// Local failures of the sync engine
#[derive(Debug, Error)]
pub enum SyncError {
    /// The local SQLite database failed
    #[error("Local storage error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// An offline mutation targeted an entity the local replica does not hold
    #[error("Entity '{id}' is not in the local replica")]
    UnknownEntity {
        /// Identifier that was requested
        id: String,
    },
}

impl SyncError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new unknown-entity error
    pub fn unknown_entity(id: impl ToString) -> Self {
        Self::UnknownEntity { id: id.to_string() }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
