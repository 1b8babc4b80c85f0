//! # Sync State
//!
//! Snapshot of the engine's synchronization state for status displays.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::sync::network_monitor::NetworkStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatus {
    /// Reachability the caller reported
    pub online: bool,
    /// Whether a replay pass is running
    pub is_syncing: bool,
    /// Intents waiting in the queue
    pub pending_intents: usize,
    /// Intents that failed at least one replay attempt
    pub failed_intents: usize,
    /// End of the last completed replay or refetch
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl SyncStatus {
    pub fn network_status(&self) -> NetworkStatus {
        NetworkStatus::from_online(self.online)
    }

    /// Everything local has been confirmed remotely
    pub fn is_settled(&self) -> bool {
        self.pending_intents == 0 && !self.is_syncing
    }
}
