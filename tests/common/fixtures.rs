//! Engine fixtures
//!
//! A `SyncEngine` wired to a `MemoryRemote`, plus payload builders that pass
//! create validation.

use geoledger::client::local_db::LocalDatabase;
use geoledger::client::remote::MemoryRemote;
use geoledger::client::{SyncEngine, SyncOptions};
use geoledger::shared::{Actor, CustomerPayload};
use std::sync::Arc;

use super::database::create_test_db;

pub const TEST_USER_ID: &str = "user-1";
pub const TEST_USER_NAME: &str = "Alice";

/// Engine plus handles on its collaborators
pub struct TestClient {
    pub engine: Arc<SyncEngine>,
    pub remote: Arc<MemoryRemote>,
    pub db: Arc<LocalDatabase>,
}

impl TestClient {
    pub async fn new() -> Self {
        Self::with_db(create_test_db().await).await
    }

    pub async fn with_db(db: Arc<LocalDatabase>) -> Self {
        let remote = Arc::new(MemoryRemote::new());
        remote.add_profile(TEST_USER_ID, TEST_USER_NAME);
        Self::with_parts(db, remote)
    }

    pub fn with_parts(db: Arc<LocalDatabase>, remote: Arc<MemoryRemote>) -> Self {
        let engine = Arc::new(SyncEngine::new(db.clone(), remote.clone(), SyncOptions::default()));
        Self { engine, remote, db }
    }

    pub fn actor(&self) -> Actor {
        Actor::new(TEST_USER_ID, false)
    }
}

/// Payload that passes create validation
pub fn valid_payload(name: &str) -> CustomerPayload {
    CustomerPayload {
        name: Some(name.to_string()),
        phone: Some("+20 100 123 4567".to_string()),
        address: Some("12 Nile Corniche".to_string()),
        province: Some("Giza".to_string()),
        area: Some("Dokki".to_string()),
        created_by: Some(TEST_USER_ID.to_string()),
        ..CustomerPayload::default()
    }
    .with_location(30.0385, 31.2118)
}
