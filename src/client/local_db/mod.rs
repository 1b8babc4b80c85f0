//! # Local Database Module
//!
//! Local SQLite storage backing the offline-first client. The database holds
//! whole JSON documents keyed by name rather than one row per customer: the
//! replica snapshot and the sync queue are each replaced in a single
//! statement, so a reader never observes a half-written collection.
//!
//! ## Key Components
//!
//! - `LocalDatabase`: connection pool, schema and the key-value primitive
//! - `schema.rs`: schema definitions and migrations
//! - `replica.rs`: the customer snapshot (`LocalReplicaStore`)
//! - `sync.rs`: sync metadata such as the last successful sync time
//!
//! ## Usage
//!
//! ```rust,no_run
//! use geoledger::client::local_db::{LocalDatabase, LocalReplicaStore, CUSTOMERS_KEY};
//! use std::sync::Arc;
//!
//! # async fn example() -> geoledger::shared::SyncResult<()> {
//! let db = Arc::new(LocalDatabase::new().await?);
//! let replica = LocalReplicaStore::new(db);
//! let customers = replica.get(CUSTOMERS_KEY).await?.unwrap_or_default();
//! # Ok(())
//! # }
//! ```

pub mod schema;
pub mod replica;
pub mod sync;

pub use replica::{LocalReplicaStore, CUSTOMERS_KEY};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::shared::error::SyncResult;

/// Local database connection manager
///
/// Manages the SQLite connection pool and exposes the whole-value
/// key-value primitive the stores are built on.
#[derive(Debug)]
pub struct LocalDatabase {
    pool: SqlitePool,
}

impl LocalDatabase {
    /// Open or create the local database at the platform data directory
    pub async fn new() -> SyncResult<Self> {
        Self::open(Self::default_path()).await
    }

    /// Open or create the local database at `path`
    ///
    /// Uses WAL mode so readers never block the single writer.
    pub async fn open(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::debug!("Opened local database at {}", path.display());
        Ok(db)
    }

    /// Open a private in-memory database
    ///
    /// The pool is pinned to one connection that never expires, since every
    /// SQLite in-memory connection is its own database.
    pub async fn in_memory() -> SyncResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Default database file path
    ///
    /// Uses the system's data directory when available.
    pub fn default_path() -> PathBuf {
        Self::path_in(None)
    }

    /// Database file path inside `data_dir`, or the platform default
    pub fn path_in(data_dir: Option<&Path>) -> PathBuf {
        let mut path = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                let mut base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
                base.push("geoledger");
                base
            }
        };
        path.push("local.db");
        path
    }

    /// Initialize database schema
    async fn init_schema(&self) -> SyncResult<()> {
        for statement in schema::SCHEMA_STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        self.run_migrations().await
    }

    /// Run database migrations
    async fn run_migrations(&self) -> SyncResult<()> {
        sqlx::query(schema::CREATE_SCHEMA_MIGRATIONS)
            .execute(&self.pool)
            .await?;

        let current_version: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        for version in schema::get_pending_migrations(current_version.0) {
            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(version)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await?;
            tracing::info!("Applied local schema migration {}", version);
        }

        Ok(())
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Replace the value stored under `key`
    ///
    /// A single `INSERT OR REPLACE`: the old document stays visible until the
    /// new one is committed.
    pub async fn put_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> SyncResult<()> {
        let data = serde_json::to_string(value)?;
        sqlx::query("INSERT OR REPLACE INTO local_store (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(data)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Read the value stored under `key`
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str) -> SyncResult<Option<T>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM local_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((data,)) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    /// Remove the value stored under `key`
    pub async fn delete_value(&self, key: &str) -> SyncResult<()> {
        sqlx::query("DELETE FROM local_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get database statistics
    ///
    /// Returns basic statistics about the local database for debugging.
    pub async fn get_stats(&self) -> SyncResult<DatabaseStats> {
        let documents: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM local_store")
            .fetch_one(&self.pool)
            .await?;

        let customers: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(json_array_length(value)), 0) FROM local_store WHERE key = ?",
        )
        .bind(CUSTOMERS_KEY)
        .fetch_one(&self.pool)
        .await?;

        let pending: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(json_array_length(value)), 0) FROM local_store WHERE key = ?",
        )
        .bind(crate::client::offline::queue::SYNC_QUEUE_KEY)
        .fetch_one(&self.pool)
        .await?;

        Ok(DatabaseStats {
            document_count: documents.0 as u64,
            customer_count: customers.0 as u64,
            pending_operations: pending.0 as u64,
        })
    }

    /// Drop every stored document and all sync metadata
    pub async fn clear(&self) -> SyncResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM local_store").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sync_metadata").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Number of stored documents
    pub document_count: u64,
    /// Customers in the replica snapshot
    pub customer_count: u64,
    /// Intents waiting in the sync queue
    pub pending_operations: u64,
}
