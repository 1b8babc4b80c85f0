//! # Replay Reconciliation
//!
//! Bookkeeping for one replay pass over the sync queue.
//!
//! - **Identity rewrite**: every create confirmed during the pass records a
//!   temp id → server id mapping, applied to every later intent for the same
//!   customer before it is sent.
//! - **Per-customer ordering**: once an intent for a customer fails or is
//!   deferred, every later intent for that customer is deferred too, so the
//!   next pass replays them in their original order.
//!
//! A temp id is never sent to the remote store. An update or delete whose
//! target is still a temp id without a mapping is deferred.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::client::offline::queue::{IntentKind, SyncIntent};
use crate::shared::identity::EntityId;

/// Temp id → server id mappings produced during one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    mappings: HashMap<Uuid, String>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `temp` was confirmed as `server`
    pub fn record(&mut self, temp: &EntityId, server: &EntityId) {
        if let (EntityId::Temp(uuid), EntityId::Server(id)) = (temp, server) {
            self.mappings.insert(*uuid, id.clone());
        }
    }

    /// The identifier to use remotely for `id`
    pub fn resolve(&self, id: &EntityId) -> EntityId {
        match id {
            EntityId::Temp(uuid) => match self.mappings.get(uuid) {
                Some(server) => EntityId::Server(server.clone()),
                None => id.clone(),
            },
            EntityId::Server(_) => id.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Mappings as `(temp, server)` identifier pairs
    pub fn pairs(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.mappings
            .iter()
            .map(|(temp, server)| (EntityId::Temp(*temp), EntityId::Server(server.clone())))
    }
}

/// Why an intent was left queued without being sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    /// The customer's create has not been confirmed yet
    UnresolvedTemp,
    /// An earlier intent for the same customer failed in this pass
    EarlierFailure,
}

/// What to do with the next intent of the pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Send it, addressed to this identifier
    Send(EntityId),
    /// Leave it queued
    Defer(DeferReason),
}

/// State of one replay pass
#[derive(Debug, Default)]
pub struct ReplayPass {
    ids: IdMap,
    blocked: HashSet<EntityId>,
}

impl ReplayPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide how to replay `intent`
    pub fn plan(&self, intent: &SyncIntent) -> Disposition {
        if self.blocked.contains(&intent.target_id) {
            return Disposition::Defer(DeferReason::EarlierFailure);
        }

        let target = self.ids.resolve(&intent.target_id);
        if intent.kind == IntentKind::Create {
            return Disposition::Send(target);
        }
        if self.blocked.contains(&target) {
            return Disposition::Defer(DeferReason::EarlierFailure);
        }
        if target.is_temp() {
            return Disposition::Defer(DeferReason::UnresolvedTemp);
        }
        Disposition::Send(target)
    }

    /// A create for `temp` was confirmed as `server`
    pub fn confirm_create(&mut self, temp: &EntityId, server: &EntityId) {
        self.ids.record(temp, server);
    }

    /// An intent for `target` failed or was deferred
    pub fn block(&mut self, target: &EntityId) {
        let resolved = self.ids.resolve(target);
        self.blocked.insert(target.clone());
        self.blocked.insert(resolved);
    }

    pub fn id_map(&self) -> &IdMap {
        &self.ids
    }
}
