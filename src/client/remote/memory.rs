//! # In-Memory Remote Store
//!
//! An authoritative store that lives in the process. Used by the test suite
//! and for running the client without a backend.
//!
//! Every call is counted, and failures can be injected per operation or for
//! the whole store, which is how "the network went away" is simulated.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::client::remote::{RemoteResult, RemoteStore};
use crate::shared::customer::{Customer, CustomerPayload};
use crate::shared::error::RemoteError;
use crate::shared::identity::EntityId;
use crate::shared::profile::AuthorProfile;

/// Remote operations, for call counting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    Insert,
    Update,
    Delete,
    SelectAll,
    SelectProfiles,
}

#[derive(Debug, Default)]
struct State {
    /// Newest first
    rows: Vec<Customer>,
    profiles: HashMap<String, String>,
    next_id: u64,
    unreachable: bool,
    injected: HashMap<RemoteOp, VecDeque<RemoteError>>,
    calls: HashMap<RemoteOp, usize>,
    latency: Option<Duration>,
}

/// In-process authoritative store
#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: Mutex<State>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        // A panicking test thread must not wedge every other assertion
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state)
    }

    /// Register a profile that `select_profiles_by_ids` can resolve
    pub fn add_profile(&self, id: impl Into<String>, name: impl Into<String>) {
        self.with_state(|s| {
            s.profiles.insert(id.into(), name.into());
        });
    }

    /// Seed a row directly, bypassing counters
    pub fn seed(&self, payload: &CustomerPayload) -> Customer {
        self.with_state(|s| Self::insert_row(s, payload))
    }

    /// Make every call fail with a transport error, or restore service
    pub fn set_reachable(&self, reachable: bool) {
        self.with_state(|s| s.unreachable = !reachable);
    }

    /// Fail the next `times` calls of `op` with `error`
    pub fn fail_next(&self, op: RemoteOp, times: usize, error: RemoteError) {
        self.with_state(|s| {
            let queue = s.injected.entry(op).or_default();
            for _ in 0..times {
                queue.push_back(error.clone());
            }
        });
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.with_state(|s| s.latency = latency);
    }

    /// Number of calls made for `op`, including failed ones
    pub fn calls(&self, op: RemoteOp) -> usize {
        self.with_state(|s| s.calls.get(&op).copied().unwrap_or(0))
    }

    /// Current rows, newest first
    pub fn rows(&self) -> Vec<Customer> {
        self.with_state(|s| s.rows.clone())
    }

    pub fn row(&self, id: &str) -> Option<Customer> {
        self.with_state(|s| s.rows.iter().find(|c| c.id.as_server() == Some(id)).cloned())
    }

    fn insert_row(state: &mut State, payload: &CustomerPayload) -> Customer {
        state.next_id += 1;
        let row = Customer::from_payload(
            EntityId::server(state.next_id.to_string()),
            payload,
            Utc::now(),
        );
        state.rows.insert(0, row.clone());
        row
    }

    /// Count the call and decide whether it fails
    async fn enter(&self, op: RemoteOp) -> RemoteResult<()> {
        let latency = self.with_state(|s| s.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.with_state(|s| {
            *s.calls.entry(op).or_default() += 1;
            if s.unreachable {
                return Err(RemoteError::transport("remote store unreachable"));
            }
            match s.injected.get_mut(&op).and_then(|q| q.pop_front()) {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn insert(&self, payload: &CustomerPayload) -> RemoteResult<Customer> {
        self.enter(RemoteOp::Insert).await?;
        Ok(self.with_state(|s| Self::insert_row(s, payload)))
    }

    async fn update(&self, id: &str, payload: &CustomerPayload) -> RemoteResult<Customer> {
        self.enter(RemoteOp::Update).await?;
        self.with_state(|s| {
            let row = s
                .rows
                .iter_mut()
                .find(|c| c.id.as_server() == Some(id))
                .ok_or_else(|| RemoteError::rejected(404, format!("no customer with id {}", id)))?;
            row.apply(payload);
            Ok(row.clone())
        })
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        self.enter(RemoteOp::Delete).await?;
        self.with_state(|s| s.rows.retain(|c| c.id.as_server() != Some(id)));
        Ok(())
    }

    async fn select_all(&self) -> RemoteResult<Vec<Customer>> {
        self.enter(RemoteOp::SelectAll).await?;
        Ok(self.rows())
    }

    async fn select_profiles_by_ids(&self, ids: &[String]) -> RemoteResult<Vec<AuthorProfile>> {
        self.enter(RemoteOp::SelectProfiles).await?;
        Ok(self.with_state(|s| {
            ids.iter()
                .filter_map(|id| {
                    s.profiles
                        .get(id)
                        .map(|name| AuthorProfile::new(id.clone(), name.clone()))
                })
                .collect()
        }))
    }
}
