//! # Background Replay
//!
//! Runs a replay pass every time the connectivity monitor reports an
//! Offline→Online transition.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::sync::engine::SyncEngine;
use crate::client::sync::network_monitor::{ConnectivityMonitor, NetworkStatus, SubscriptionId};

/// Handle of the background replay task; dropping it stops the task
#[derive(Debug)]
pub struct ReplayTrigger {
    monitor: Arc<ConnectivityMonitor>,
    subscription: Option<SubscriptionId>,
    handle: Option<JoinHandle<()>>,
}

impl ReplayTrigger {
    /// Subscribe to `monitor` and replay after every reconnect
    ///
    /// Transitions are delivered one by one through a channel, so a
    /// reconnect that happens while a replay is running gets its own pass
    /// once the current one finishes.
    pub fn spawn(engine: Arc<SyncEngine>, monitor: &Arc<ConnectivityMonitor>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<NetworkStatus>();
        let subscription = monitor.subscribe(move |status| {
            // Receiver is gone once the task stops
            let _ = tx.send(status);
        });

        let handle = tokio::spawn(async move {
            // The monitor only reports transitions, so every Online is a reconnect
            while let Some(status) = rx.recv().await {
                if !status.is_online() {
                    continue;
                }
                tracing::info!("Back online, replaying queued changes");
                match engine.replay(true).await {
                    Ok(report) if report.remaining() > 0 => {
                        tracing::warn!("{} changes still queued after replay", report.remaining());
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!("Background replay failed: {}", e),
                }
            }
            tracing::debug!("Connectivity subscription closed, replay trigger exiting");
        });

        Self {
            monitor: Arc::clone(monitor),
            subscription: Some(subscription),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the background task
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.monitor.unsubscribe(id);
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ReplayTrigger {
    fn drop(&mut self) {
        self.shutdown();
    }
}
