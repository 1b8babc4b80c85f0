//! # Remote Store
//!
//! Contract of the authoritative store the engine synchronizes with. The
//! engine treats it as a black-box CRUD service: none of the calls are
//! transactional with each other and every one of them may fail.
//!
//! Identifiers passed in are always server ids; the type system keeps
//! temporary ids on the client side of this boundary.
//!
//! ## Implementations
//!
//! - `http.rs`: PostgREST-style HTTP endpoint (`HttpRemote`)
//! - `memory.rs`: in-process store with failure injection (`MemoryRemote`)

pub mod http;
pub mod memory;

pub use http::HttpRemote;
pub use memory::{MemoryRemote, RemoteOp};

use async_trait::async_trait;

use crate::shared::customer::{Customer, CustomerPayload};
use crate::shared::error::RemoteError;
use crate::shared::profile::AuthorProfile;

/// Result alias for remote calls
pub type RemoteResult<T> = Result<T, RemoteError>;

/// The authoritative customer store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert a customer; returns the stored row with its server id
    async fn insert(&self, payload: &CustomerPayload) -> RemoteResult<Customer>;

    /// Apply a partial update; returns the full stored row
    async fn update(&self, id: &str, payload: &CustomerPayload) -> RemoteResult<Customer>;

    /// Delete a customer. Deleting a missing row is acknowledged.
    async fn delete(&self, id: &str) -> RemoteResult<()>;

    /// Every customer, newest first
    async fn select_all(&self) -> RemoteResult<Vec<Customer>>;

    /// Profiles for the given ids; unknown ids are simply absent
    async fn select_profiles_by_ids(&self, ids: &[String]) -> RemoteResult<Vec<AuthorProfile>>;
}
