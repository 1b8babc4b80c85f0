//! # Sync Metadata Operations
//!
//! Small string values that describe synchronization progress, such as the
//! time of the last successful replay. Stored apart from the document table,
//! so clearing the replica keeps them.

use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::client::local_db::LocalDatabase;
use crate::shared::error::SyncResult;

/// Metadata key for the last successful full sync
pub const LAST_SYNC_KEY: &str = "last_sync_time";

impl LocalDatabase {
    /// Set sync metadata
    pub async fn set_sync_metadata(&self, key: &str, value: &str) -> SyncResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO sync_metadata (key, value, updated_at)
             VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Get sync metadata
    pub async fn get_sync_metadata(&self, key: &str) -> SyncResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM sync_metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    /// Get last sync timestamp
    pub async fn get_last_sync_time(&self) -> SyncResult<Option<DateTime<Utc>>> {
        let value = self.get_sync_metadata(LAST_SYNC_KEY).await?;
        Ok(value
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|t| t.with_timezone(&Utc)))
    }

    /// Set last sync timestamp to now
    pub async fn set_last_sync_time(&self) -> SyncResult<DateTime<Utc>> {
        let now = Utc::now();
        self.set_sync_metadata(LAST_SYNC_KEY, &now.to_rfc3339()).await?;
        Ok(now)
    }
}
