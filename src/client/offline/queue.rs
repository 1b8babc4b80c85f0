//! # Sync Queue
//!
//! Durable, ordered log of mutations that have not been confirmed by the
//! authoritative store.
//!
//! ## Guarantees
//!
//! - **FIFO**: intents come back in the order they were enqueued and are never
//!   reordered or coalesced, even when several target the same customer. A
//!   create must replay before the updates that depend on its server id.
//! - **Durable**: `enqueue` returns only after the queue document is
//!   committed to the local database, so intents survive restarts.
//! - **Unique operation ids**: every intent gets a random UUID, unrelated to
//!   any server or temporary entity id.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use geoledger::client::offline::{IntentKind, SyncQueue};
//! use geoledger::shared::{CustomerPayload, EntityId};
//! # async fn example(queue: SyncQueue) -> geoledger::shared::SyncResult<()> {
//! let intent = queue
//!     .enqueue(IntentKind::Update, EntityId::server("42"), CustomerPayload::named("Acme"))
//!     .await?;
//!
//! for pending in queue.drain().await? {
//!     // replay against the remote store...
//!     queue.remove(&pending.operation_id).await?;
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::client::local_db::LocalDatabase;
use crate::shared::customer::CustomerPayload;
use crate::shared::error::SyncResult;
use crate::shared::identity::EntityId;

/// Key under which the queue document is stored
pub const SYNC_QUEUE_KEY: &str = "sync_queue";

/// Kind of mutation an intent replays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Create,
    Update,
    Delete,
}

/// One pending mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncIntent {
    /// Unique id of this intent
    pub operation_id: Uuid,
    /// What to replay
    pub kind: IntentKind,
    /// Customer the intent applies to
    pub target_id: EntityId,
    /// Fields to send; empty for deletes
    #[serde(default)]
    pub payload: CustomerPayload,
    /// Milliseconds since the Unix epoch
    pub enqueued_at: i64,
}

/// Intent as stored, with replay bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueuedIntent {
    #[serde(flatten)]
    pub intent: SyncIntent,
    /// Failed replay attempts so far
    #[serde(default)]
    pub attempts: u32,
    /// Error from the last failed attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Durable FIFO of pending intents
#[derive(Debug, Clone)]
pub struct SyncQueue {
    db: Arc<LocalDatabase>,
    /// Serializes read-modify-write cycles on the queue document
    write_lock: Arc<Mutex<()>>,
}

impl SyncQueue {
    pub fn new(db: Arc<LocalDatabase>) -> Self {
        Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self) -> SyncResult<Vec<QueuedIntent>> {
        Ok(self.db.get_value(SYNC_QUEUE_KEY).await?.unwrap_or_default())
    }

    async fn store(&self, entries: &[QueuedIntent]) -> SyncResult<()> {
        self.db.put_value(SYNC_QUEUE_KEY, entries).await
    }

    /// Append a new intent and persist the queue
    pub async fn enqueue(
        &self,
        kind: IntentKind,
        target_id: EntityId,
        payload: CustomerPayload,
    ) -> SyncResult<SyncIntent> {
        let intent = SyncIntent {
            operation_id: Uuid::new_v4(),
            kind,
            target_id,
            payload,
            enqueued_at: chrono::Utc::now().timestamp_millis(),
        };

        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.push(QueuedIntent {
            intent: intent.clone(),
            attempts: 0,
            last_error: None,
        });
        self.store(&entries).await?;

        tracing::debug!(
            "Queued {:?} for {} (operation {}, {} pending)",
            intent.kind,
            intent.target_id,
            intent.operation_id,
            entries.len()
        );
        Ok(intent)
    }

    /// Pending intents in enqueue order; nothing is removed
    pub async fn drain(&self) -> SyncResult<Vec<SyncIntent>> {
        Ok(self.load().await?.into_iter().map(|q| q.intent).collect())
    }

    /// Pending intents with their replay bookkeeping
    pub async fn all(&self) -> SyncResult<Vec<QueuedIntent>> {
        self.load().await
    }

    /// Remove an intent after its replay was confirmed
    ///
    /// Returns whether the intent was still queued.
    pub async fn remove(&self, operation_id: &Uuid) -> SyncResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|q| q.intent.operation_id != *operation_id);

        if entries.len() == before {
            return Ok(false);
        }
        self.store(&entries).await?;
        Ok(true)
    }

    /// Record a failed replay attempt; the intent stays queued
    pub async fn record_failure(&self, operation_id: &Uuid, error: &str) -> SyncResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if let Some(entry) = entries
            .iter_mut()
            .find(|q| q.intent.operation_id == *operation_id)
        {
            entry.attempts += 1;
            entry.last_error = Some(error.to_string());
            self.store(&entries).await?;
        }
        Ok(())
    }

    /// Acknowledge a replayed create and retarget its followers
    ///
    /// Removes the create and points every later intent for `temp` at
    /// `server` in a single write, so a crash cannot leave followers
    /// addressed to an id that will never resolve, nor replay the create
    /// twice. Returns the number of retargeted intents.
    pub async fn resolve_create(
        &self,
        operation_id: &Uuid,
        temp: &EntityId,
        server: &EntityId,
    ) -> SyncResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.retain(|q| q.intent.operation_id != *operation_id);

        let mut rewritten = 0;
        for entry in entries.iter_mut().filter(|q| q.intent.target_id == *temp) {
            entry.intent.target_id = server.clone();
            rewritten += 1;
        }
        self.store(&entries).await?;
        Ok(rewritten)
    }

    /// Whether any intent for `id` is still queued
    pub async fn has_pending_for(&self, id: &EntityId) -> SyncResult<bool> {
        Ok(self.load().await?.iter().any(|q| q.intent.target_id == *id))
    }

    pub async fn len(&self) -> SyncResult<usize> {
        Ok(self.load().await?.len())
    }

    pub async fn is_empty(&self) -> SyncResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Drop every queued intent (logout)
    pub async fn clear(&self) -> SyncResult<()> {
        let _guard = self.write_lock.lock().await;
        self.db.delete_value(SYNC_QUEUE_KEY).await
    }
}
