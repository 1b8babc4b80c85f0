//! # Optimistic Replica Updates
//!
//! In-memory edits applied to a replica snapshot before (or instead of)
//! remote confirmation. The engine loads the snapshot, edits it through
//! `OptimisticReplica`, and writes the whole thing back.
//!
//! Ordering is newest first, matching how the collection is listed.

use crate::client::offline::queue::{IntentKind, SyncIntent};
use crate::shared::customer::Customer;
use crate::shared::identity::EntityId;

/// A replica snapshot being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimisticReplica {
    customers: Vec<Customer>,
}

impl OptimisticReplica {
    pub fn new(customers: Vec<Customer>) -> Self {
        Self { customers }
    }

    pub fn get(&self, id: &EntityId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == *id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut Customer> {
        self.customers.iter_mut().find(|c| c.id == *id)
    }

    /// Put `customer` at the front, dropping any older entry with its id
    pub fn prepend(&mut self, customer: Customer) {
        self.customers.retain(|c| c.id != customer.id);
        self.customers.insert(0, customer);
    }

    /// Replace the entry with the same id in place, or prepend when absent
    pub fn upsert(&mut self, customer: Customer) {
        match self.get_mut(&customer.id) {
            Some(slot) => *slot = customer,
            None => self.prepend(customer),
        }
    }

    /// Remove the entry for `id`; returns whether one existed
    pub fn remove(&mut self, id: &EntityId) -> bool {
        let before = self.customers.len();
        self.customers.retain(|c| c.id != *id);
        self.customers.len() != before
    }

    /// Swap the entry held under `temp` for its confirmed version
    ///
    /// The entry keeps its position. When the temp entry is gone (deleted
    /// locally before replay) nothing is inserted.
    pub fn confirm_create(&mut self, temp: &EntityId, confirmed: Customer) -> bool {
        // A refetch may already have brought the confirmed row in
        self.customers.retain(|c| c.id != confirmed.id);
        match self.get_mut(temp) {
            Some(slot) => {
                *slot = confirmed;
                true
            }
            None => false,
        }
    }

    /// Re-apply still-queued intents on top of a freshly fetched snapshot
    ///
    /// `previous` is the local snapshot the intents were originally applied
    /// to; pending creates and the author annotations of pending updates are
    /// taken from it.
    pub fn overlay_pending(&mut self, intents: &[SyncIntent], previous: &OptimisticReplica) {
        for intent in intents {
            match intent.kind {
                IntentKind::Create => {
                    if let Some(local) = previous.get(&intent.target_id) {
                        self.prepend(local.clone());
                    }
                }
                IntentKind::Update => {
                    if let Some(current) = self.get_mut(&intent.target_id) {
                        current.apply(&intent.payload);
                        if let Some(local) = previous.get(&intent.target_id) {
                            current.author_profile = local.author_profile.clone();
                        }
                    }
                }
                IntentKind::Delete => {
                    self.remove(&intent.target_id);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn as_slice(&self) -> &[Customer] {
        &self.customers
    }

    pub fn into_vec(self) -> Vec<Customer> {
        self.customers
    }
}
