//! # Customer Sync Engine
//!
//! Routes every customer operation either to the authoritative store or to
//! the local replica plus the sync queue, and replays the queue when the
//! store becomes reachable again.
//!
//! ## Routing
//!
//! - **Online**: the remote call is made first; its result is enriched and
//!   written through to the replica.
//! - **Offline or remote failure**: the change is applied to the replica
//!   optimistically and an intent is queued. Remote failures never surface
//!   as errors, only as `WriteOutcome { queued: true, .. }`.
//!
//! Updates and deletes only go to the store directly when the target has a
//! server id and no intent for it is still queued, so a customer's changes
//! always reach the store in the order they were made.
//!
//! ## Locking
//!
//! `replica_lock` serializes every read-modify-write of the replica together
//! with the queue write that accompanies it. `replay_lock` admits one replay
//! pass at a time; a replay requested while one runs is skipped.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::client::enrich::ProfileEnricher;
use crate::client::local_db::{LocalDatabase, LocalReplicaStore};
use crate::client::offline::{
    Disposition, IntentKind, OptimisticReplica, ReplayPass, SyncIntent, SyncQueue,
};
use crate::client::remote::{RemoteResult, RemoteStore};
use crate::client::sync::{ReplayReport, SyncOptions, SyncStatus};
use crate::shared::customer::{Customer, CustomerPayload};
use crate::shared::error::{RemoteError, SyncError, SyncResult};
use crate::shared::identity::EntityId;
use crate::shared::profile::Actor;

/// Result of a create or update
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// The customer as the caller should now display it
    pub customer: Customer,
    /// The authoritative store accepted the change
    pub confirmed: bool,
    /// The change waits in the sync queue
    pub queued: bool,
    /// Why the store was not used, when it was tried and failed
    pub remote_error: Option<RemoteError>,
}

impl WriteOutcome {
    fn confirmed(customer: Customer) -> Self {
        Self {
            customer,
            confirmed: true,
            queued: false,
            remote_error: None,
        }
    }

    fn queued(customer: Customer, remote_error: Option<RemoteError>) -> Self {
        Self {
            customer,
            confirmed: false,
            queued: true,
            remote_error,
        }
    }
}

/// Offline-first customer service
pub struct SyncEngine {
    db: Arc<LocalDatabase>,
    replica: LocalReplicaStore,
    queue: SyncQueue,
    remote: Arc<dyn RemoteStore>,
    enricher: ProfileEnricher,
    options: SyncOptions,
    replica_lock: Mutex<()>,
    replay_lock: Mutex<()>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    pub fn new(db: Arc<LocalDatabase>, remote: Arc<dyn RemoteStore>, options: SyncOptions) -> Self {
        Self {
            replica: LocalReplicaStore::new(db.clone()),
            queue: SyncQueue::new(db.clone()),
            enricher: ProfileEnricher::new(remote.clone()),
            db,
            remote,
            options,
            replica_lock: Mutex::new(()),
            replay_lock: Mutex::new(()),
        }
    }

    pub fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    /// Create a customer
    ///
    /// The payload is validated first; a validation failure is returned
    /// before anything is stored or queued.
    pub async fn create(
        &self,
        payload: CustomerPayload,
        online: bool,
        author_name: &str,
    ) -> SyncResult<WriteOutcome> {
        payload.validate_new()?;

        let mut remote_error = None;
        if online {
            match self.call(self.remote.insert(&payload)).await {
                Ok(row) => {
                    let customer = ProfileEnricher::annotate(row, author_name);
                    self.edit_replica(|replica| replica.prepend(customer.clone()))
                        .await?;
                    tracing::info!("Created customer {}", customer.id);
                    return Ok(WriteOutcome::confirmed(customer));
                }
                Err(e) => {
                    tracing::warn!("Remote create failed, queueing instead: {}", e);
                    remote_error = Some(e);
                }
            }
        }

        let local = Customer::from_payload(EntityId::new_temp(), &payload, Utc::now());
        let local = ProfileEnricher::annotate(local, author_name);

        let _guard = self.replica_lock.lock().await;
        self.queue
            .enqueue(IntentKind::Create, local.id.clone(), payload)
            .await?;
        let mut replica = self.load_replica().await?;
        replica.prepend(local.clone());
        self.store_replica(&replica).await?;

        tracing::info!("Queued create of customer {}", local.id);
        Ok(WriteOutcome::queued(local, remote_error))
    }

    /// Update a customer
    ///
    /// Offline, `id` must be present in the local replica; otherwise
    /// `SyncError::UnknownEntity` is returned and nothing is queued.
    pub async fn update(
        &self,
        id: &EntityId,
        payload: CustomerPayload,
        online: bool,
        author_name: &str,
    ) -> SyncResult<WriteOutcome> {
        let mut remote_error = None;
        if let Some(server_id) = self.direct_target(id, online).await? {
            match self.call(self.remote.update(server_id, &payload)).await {
                Ok(row) => {
                    let customer = ProfileEnricher::annotate(row, author_name);
                    self.edit_replica(|replica| replica.upsert(customer.clone()))
                        .await?;
                    tracing::info!("Updated customer {}", customer.id);
                    return Ok(WriteOutcome::confirmed(customer));
                }
                Err(e) => {
                    tracing::warn!("Remote update of {} failed, queueing instead: {}", id, e);
                    remote_error = Some(e);
                }
            }
        }

        let _guard = self.replica_lock.lock().await;
        let mut replica = self.load_replica().await?;
        let current = replica
            .get_mut(id)
            .ok_or_else(|| SyncError::unknown_entity(id.to_string()))?;
        current.apply(&payload);
        let updated = ProfileEnricher::annotate(current.clone(), author_name);
        *current = updated.clone();

        self.queue
            .enqueue(IntentKind::Update, id.clone(), payload)
            .await?;
        self.store_replica(&replica).await?;

        tracing::info!("Queued update of customer {}", id);
        Ok(WriteOutcome::queued(updated, remote_error))
    }

    /// Delete a customer
    ///
    /// Returns `true` when the store confirmed the delete and `false` when
    /// it was applied locally and queued.
    pub async fn delete(&self, id: &EntityId, online: bool) -> SyncResult<bool> {
        if let Some(server_id) = self.direct_target(id, online).await? {
            match self.call(self.remote.delete(server_id)).await {
                Ok(()) => {
                    self.edit_replica(|replica| replica.remove(id)).await?;
                    tracing::info!("Deleted customer {}", id);
                    return Ok(true);
                }
                Err(e) => {
                    tracing::warn!("Remote delete of {} failed, queueing instead: {}", id, e);
                }
            }
        }

        let _guard = self.replica_lock.lock().await;
        self.queue
            .enqueue(IntentKind::Delete, id.clone(), CustomerPayload::default())
            .await?;
        let mut replica = self.load_replica().await?;
        replica.remove(id);
        self.store_replica(&replica).await?;

        tracing::info!("Queued delete of customer {}", id);
        Ok(false)
    }

    /// List every customer, newest first
    ///
    /// Online, the collection is refetched, enriched and stored. Offline, or
    /// when the refetch fails, the last stored snapshot is returned exactly
    /// as stored. A signed-out caller (`actor` is `None`) gets nothing.
    pub async fn fetch_all(&self, online: bool, actor: Option<&Actor>) -> SyncResult<Vec<Customer>> {
        if actor.is_none() {
            return Ok(Vec::new());
        }

        if online {
            if let Some(customers) = self.refetch().await? {
                return Ok(customers);
            }
        }

        Ok(self
            .replica
            .get(&self.options.collection_key)
            .await?
            .unwrap_or_default())
    }

    /// Replay queued intents against the store, oldest first
    ///
    /// Each intent is attempted once. Confirmed intents are removed; failed
    /// ones stay queued with their attempt recorded. The pass ends with a
    /// full refetch. Offline, or while another pass runs, nothing happens.
    pub async fn replay(&self, online: bool) -> SyncResult<ReplayReport> {
        if !online {
            tracing::debug!("Offline, replay skipped");
            return Ok(ReplayReport::skipped());
        }
        let Ok(_running) = self.replay_lock.try_lock() else {
            tracing::info!("Replay already running, skipped");
            return Ok(ReplayReport::skipped());
        };

        let started = Instant::now();
        let entries = self.queue.all().await?;
        let mut report = ReplayReport {
            attempted: entries.len(),
            ..ReplayReport::default()
        };
        let mut pass = ReplayPass::new();

        for entry in entries {
            let intent = entry.intent;
            let target = match pass.plan(&intent) {
                Disposition::Send(target) => target,
                Disposition::Defer(reason) => {
                    tracing::debug!(
                        "Deferred {:?} for {} ({:?})",
                        intent.kind,
                        intent.target_id,
                        reason
                    );
                    pass.block(&intent.target_id);
                    report.deferred += 1;
                    continue;
                }
            };

            match self.send(&intent, &target).await {
                Ok(Some(confirmed)) => {
                    pass.confirm_create(&intent.target_id, &confirmed.id);
                    self.resolve_create(&intent, confirmed).await?;
                    report.replayed += 1;
                }
                Ok(None) => {
                    self.queue.remove(&intent.operation_id).await?;
                    tracing::debug!("Replayed {:?} for {}", intent.kind, target);
                    report.replayed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Replay of {:?} for {} failed: {}",
                        intent.kind,
                        intent.target_id,
                        e
                    );
                    self.queue
                        .record_failure(&intent.operation_id, &e.to_string())
                        .await?;
                    pass.block(&intent.target_id);
                    report.failed += 1;
                }
            }
        }

        report.id_mappings = pass.id_map().pairs().collect();
        report.refetched = match self.refetch().await {
            Ok(fetched) => fetched.is_some(),
            Err(e) => {
                tracing::error!("Storing refetched customers failed: {}", e);
                false
            }
        };
        report.duration = started.elapsed();

        tracing::info!(
            "Replay finished: {} replayed, {} failed, {} deferred of {} in {:?}",
            report.replayed,
            report.failed,
            report.deferred,
            report.attempted,
            report.duration
        );
        Ok(report)
    }

    /// Wipe the local replica, the sync queue and the sync metadata (logout)
    pub async fn clear_local(&self) -> SyncResult<()> {
        let _guard = self.replica_lock.lock().await;
        self.queue.clear().await?;
        self.db.clear().await?;
        tracing::info!("Cleared local customer data");
        Ok(())
    }

    pub async fn status(&self, online: bool) -> SyncResult<SyncStatus> {
        let entries = self.queue.all().await?;
        Ok(SyncStatus {
            online,
            is_syncing: self.replay_lock.try_lock().is_err(),
            pending_intents: entries.len(),
            failed_intents: entries.iter().filter(|q| q.attempts > 0).count(),
            last_sync_at: self.db.get_last_sync_time().await?,
        })
    }

    /// Server id to address directly, when the direct route is allowed
    async fn direct_target<'a>(&self, id: &'a EntityId, online: bool) -> SyncResult<Option<&'a str>> {
        if !online {
            return Ok(None);
        }
        let Some(server_id) = id.as_server() else {
            return Ok(None);
        };
        if self.queue.has_pending_for(id).await? {
            tracing::debug!("Customer {} has queued changes, routing through the queue", id);
            return Ok(None);
        }
        Ok(Some(server_id))
    }

    /// Replay one intent; a confirmed create returns the stored row
    async fn send(&self, intent: &SyncIntent, target: &EntityId) -> RemoteResult<Option<Customer>> {
        if intent.kind == IntentKind::Create {
            return self.call(self.remote.insert(&intent.payload)).await.map(Some);
        }

        let server_id = target.as_server().ok_or_else(|| {
            RemoteError::rejected(400, format!("temporary id {} cannot be sent", target))
        })?;
        match intent.kind {
            IntentKind::Update => self
                .call(self.remote.update(server_id, &intent.payload))
                .await
                .map(|_| None),
            _ => self.call(self.remote.delete(server_id)).await.map(|()| None),
        }
    }

    /// Rewrite every local reference to a confirmed create
    async fn resolve_create(&self, intent: &SyncIntent, mut confirmed: Customer) -> SyncResult<()> {
        let _guard = self.replica_lock.lock().await;
        let retargeted = self
            .queue
            .resolve_create(&intent.operation_id, &intent.target_id, &confirmed.id)
            .await?;

        let mut replica = self.load_replica().await?;
        if let Some(local) = replica.get(&intent.target_id) {
            confirmed.author_profile = local.author_profile.clone();
        }
        let temp = intent.target_id.clone();
        let server = confirmed.id.clone();
        if replica.confirm_create(&temp, confirmed) {
            self.store_replica(&replica).await?;
        }

        tracing::info!(
            "Customer {} confirmed as {} ({} queued intents retargeted)",
            temp,
            server,
            retargeted
        );
        Ok(())
    }

    /// Refetch the collection and store it with pending intents overlaid
    ///
    /// Returns `None` when the store could not be read.
    async fn refetch(&self) -> SyncResult<Option<Vec<Customer>>> {
        let rows = match self.call(self.remote.select_all()).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Refetch failed, keeping local snapshot: {}", e);
                return Ok(None);
            }
        };
        let enriched = self.enricher.enrich(rows).await;

        let _guard = self.replica_lock.lock().await;
        let pending = self.queue.drain().await?;
        let mut fresh = OptimisticReplica::new(enriched);
        if !pending.is_empty() {
            let previous = self.load_replica().await?;
            fresh.overlay_pending(&pending, &previous);
        }
        self.store_replica(&fresh).await?;
        self.db.set_last_sync_time().await?;

        tracing::debug!(
            "Refetched {} customers ({} pending intents overlaid)",
            fresh.len(),
            pending.len()
        );
        Ok(Some(fresh.into_vec()))
    }

    /// Bound a remote call by the request timeout
    async fn call<T>(&self, request: impl Future<Output = RemoteResult<T>>) -> RemoteResult<T> {
        match tokio::time::timeout(self.options.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout {
                millis: self.options.request_timeout.as_millis() as u64,
            }),
        }
    }

    async fn load_replica(&self) -> SyncResult<OptimisticReplica> {
        let customers = self
            .replica
            .get(&self.options.collection_key)
            .await?
            .unwrap_or_default();
        Ok(OptimisticReplica::new(customers))
    }

    async fn store_replica(&self, replica: &OptimisticReplica) -> SyncResult<()> {
        self.replica
            .put(&self.options.collection_key, replica.as_slice())
            .await
    }

    async fn edit_replica<R>(&self, edit: impl FnOnce(&mut OptimisticReplica) -> R) -> SyncResult<R> {
        let _guard = self.replica_lock.lock().await;
        let mut replica = self.load_replica().await?;
        let result = edit(&mut replica);
        self.store_replica(&replica).await?;
        Ok(result)
    }
}
