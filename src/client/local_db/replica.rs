//! # Local Replica Store
//!
//! Durable snapshot of the customer collection as last known to the client.
//!
//! There is no per-customer API. Mutating one record means
//! reading the whole collection, changing it in memory and putting the whole
//! collection back; the put is a single statement so a crash mid-write leaves
//! the previous snapshot intact.

use std::sync::Arc;

use crate::client::local_db::LocalDatabase;
use crate::shared::customer::Customer;
use crate::shared::error::SyncResult;

/// Key under which the customer snapshot is stored
pub const CUSTOMERS_KEY: &str = "customers";

/// Whole-collection customer persistence
#[derive(Debug, Clone)]
pub struct LocalReplicaStore {
    db: Arc<LocalDatabase>,
}

impl LocalReplicaStore {
    pub fn new(db: Arc<LocalDatabase>) -> Self {
        Self { db }
    }

    /// Replace the snapshot stored under `collection_key`
    pub async fn put(&self, collection_key: &str, customers: &[Customer]) -> SyncResult<()> {
        self.db.put_value(collection_key, customers).await?;
        tracing::debug!(
            "Stored {} customers under '{}'",
            customers.len(),
            collection_key
        );
        Ok(())
    }

    /// Last stored snapshot, or `None` if nothing was ever stored
    pub async fn get(&self, collection_key: &str) -> SyncResult<Option<Vec<Customer>>> {
        self.db.get_value(collection_key).await
    }
}
