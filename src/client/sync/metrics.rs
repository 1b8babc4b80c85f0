//! # Replay Metrics
//!
//! Outcome counters of one replay pass.

use std::time::Duration;

use crate::shared::identity::EntityId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    /// Intents in the queue when the pass started
    pub attempted: usize,
    /// Intents confirmed and removed
    pub replayed: usize,
    /// Intents sent and refused or unanswered
    pub failed: usize,
    /// Intents left queued without being sent
    pub deferred: usize,
    /// Creates confirmed during the pass, as `(temp, server)` pairs
    pub id_mappings: Vec<(EntityId, EntityId)>,
    /// Whether the closing refetch succeeded
    pub refetched: bool,
    /// The pass was skipped (offline, or another pass was running)
    pub skipped: bool,
    pub duration: Duration,
}

impl ReplayReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Intents still queued after the pass
    pub fn remaining(&self) -> usize {
        self.failed + self.deferred
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            1.0
        } else {
            self.replayed as f64 / self.attempted as f64
        }
    }
}
