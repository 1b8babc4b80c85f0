//! Restart durability of the replica and the sync queue

use crate::common::*;
use crate::assert_ok;
use geoledger::client::offline::IntentKind;
use geoledger::client::remote::{MemoryRemote, RemoteOp};
use geoledger::shared::CustomerPayload;
use std::sync::Arc;

#[tokio::test]
async fn queue_survives_reopening_the_database() {
    let file = TestDatabaseFile::new();
    let remote = Arc::new(MemoryRemote::new());

    let temp = {
        let client = TestClient::with_parts(file.open().await, remote.clone());
        let outcome = assert_ok!(
            client
                .engine
                .create(CustomerPayload::named("Acme"), false, TEST_USER_NAME)
                .await
        );
        assert_ok!(
            client
                .engine
                .update(
                    &outcome.customer.id,
                    CustomerPayload::default().with_status("active"),
                    false,
                    TEST_USER_NAME
                )
                .await
        );
        client.db.pool().close().await;
        outcome.customer.id
    };

    let client = TestClient::with_parts(file.open().await, remote.clone());
    let queued = assert_ok!(client.engine.queue().drain().await);
    assert_eq!(queued.len(), 2);
    assert_eq!(queued[0].kind, IntentKind::Create);
    assert_eq!(queued[1].kind, IntentKind::Update);
    assert!(queued.iter().all(|i| i.target_id == temp));

    let actor = client.actor();
    let listed = assert_ok!(client.engine.fetch_all(false, Some(&actor)).await);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, temp);
    assert_eq!(listed[0].status, "active");

    let report = assert_ok!(client.engine.replay(true).await);
    assert_eq!(report.replayed, 2);
    assert_eq!(remote.calls(RemoteOp::Insert), 1);
    assert_eq!(remote.rows()[0].status, "active");
}

#[tokio::test]
async fn failed_attempts_are_remembered_across_restarts() {
    let file = TestDatabaseFile::new();
    let remote = Arc::new(MemoryRemote::new());
    remote.set_reachable(false);

    {
        let client = TestClient::with_parts(file.open().await, remote.clone());
        assert_ok!(
            client
                .engine
                .create(CustomerPayload::named("Acme"), false, TEST_USER_NAME)
                .await
        );
        let report = assert_ok!(client.engine.replay(true).await);
        assert_eq!(report.failed, 1);
        assert!(!report.refetched);
        client.db.pool().close().await;
    }

    let client = TestClient::with_parts(file.open().await, remote);
    let queued = assert_ok!(client.engine.queue().all().await);
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].attempts, 1);
    assert!(queued[0].last_error.is_some());

    let status = assert_ok!(client.engine.status(false).await);
    assert_eq!(status.pending_intents, 1);
    assert_eq!(status.failed_intents, 1);
}

#[tokio::test]
async fn last_sync_time_is_persisted() {
    let file = TestDatabaseFile::new();
    let remote = Arc::new(MemoryRemote::new());

    let synced_at = {
        let client = TestClient::with_parts(file.open().await, remote.clone());
        let actor = client.actor();
        assert_ok!(client.engine.fetch_all(true, Some(&actor)).await);
        let at = assert_ok!(client.db.get_last_sync_time().await);
        client.db.pool().close().await;
        at
    };

    assert!(synced_at.is_some());
    let db = file.open().await;
    assert_eq!(assert_ok!(db.get_last_sync_time().await), synced_at);
}
