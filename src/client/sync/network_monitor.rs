//! # Network Monitor
//!
//! Boolean reachability of the authoritative store, with change
//! notification.
//!
//! ## Features
//!
//! - **Deduplicated transitions**: reporting the state the monitor already
//!   holds notifies nobody, so observers see each transition exactly once
//! - **Two observer styles**: a `watch` receiver for tasks and plain
//!   callbacks with explicit unsubscribe
//! - **HTTP probe**: optional background task that feeds the monitor from a
//!   periodic `HEAD` request
//!
//! How reachability is determined is up to whoever calls `report`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl NetworkStatus {
    pub fn from_online(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == Self::Online
    }
}

/// Handle returned by `ConnectivityMonitor::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(NetworkStatus) + Send + Sync>;

pub struct ConnectivityMonitor {
    state: watch::Sender<NetworkStatus>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for ConnectivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityMonitor")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(NetworkStatus::Offline)
    }
}

impl ConnectivityMonitor {
    pub fn new(initial: NetworkStatus) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn status(&self) -> NetworkStatus {
        *self.state.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.status().is_online()
    }

    /// Record the latest reachability observation
    ///
    /// Returns whether this was a transition. Observers are notified only
    /// for transitions.
    pub fn report(&self, online: bool) -> bool {
        let next = NetworkStatus::from_online(online);
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });

        if changed {
            tracing::info!("Connectivity changed: {:?}", next);
            // Listeners run outside the lock so they may (un)subscribe
            let listeners: Vec<Listener> = self
                .lock_listeners()
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            for listener in listeners {
                listener(next);
            }
        }
        changed
    }

    /// Receiver that observes every transition
    pub fn watch(&self) -> watch::Receiver<NetworkStatus> {
        self.state.subscribe()
    }

    /// Register a callback invoked on every transition
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(NetworkStatus) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, Arc::new(listener)));
        id
    }

    /// Remove a callback; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Probe `url` every `interval` and report the outcome to `monitor`
///
/// Any HTTP answer counts as reachable; only transport failures and
/// timeouts count as offline.
pub fn spawn_http_probe(
    monitor: Arc<ConnectivityMonitor>,
    url: String,
    interval: Duration,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Failed to build probe client: {}", e);
                return;
            }
        };

        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let reachable = match client.head(&url).send().await {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!("Reachability probe failed: {}", e);
                    false
                }
            };
            monitor.report(reachable);
        }
    })
}
