//! HttpRemote against a mock PostgREST server

use crate::common::*;
use crate::{assert_confirmed, assert_err, assert_ok, assert_queued};
use assert_matches::assert_matches;
use geoledger::client::local_db::LocalDatabase;
use geoledger::client::remote::RemoteStore;
use geoledger::client::{SyncEngine, SyncOptions};
use geoledger::shared::{AuthorProfile, CustomerPayload, EntityId, RemoteError};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn insert_posts_payload_and_returns_row() {
    let (server, remote) = start_mock_remote().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/customers"))
        .and(header("apikey", TEST_API_KEY))
        .and(header("Authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!({"name": "Acme", "created_by": "u1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([customer_row(7, "Acme", Some("u1"))])))
        .expect(1)
        .mount(&server)
        .await;

    let payload = CustomerPayload::named("Acme").with_created_by("u1");
    let row = assert_ok!(remote.insert(&payload).await);

    assert_eq!(row.id, EntityId::server("7"));
    assert_eq!(row.created_by.as_deref(), Some("u1"));
    assert_eq!(row.location(), Some((30.0, 31.0)));
}

#[tokio::test]
async fn update_and_delete_address_rows_by_id() {
    let (server, remote) = start_mock_remote().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/customers"))
        .and(query_param("id", "eq.7"))
        .and(body_json(json!({"status": "active"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([customer_row(7, "Acme", None)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/customers"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let updated = assert_ok!(
        remote
            .update("7", &CustomerPayload::default().with_status("active"))
            .await
    );
    assert_eq!(updated.id, EntityId::server("7"));
    assert_ok!(remote.delete("7").await);
}

#[tokio::test]
async fn select_all_orders_newest_first_and_normalizes_profiles() {
    let (server, remote) = start_mock_remote().await;
    let mut joined = customer_row(2, "Newer", Some("u1"));
    joined["user_profiles"] = json!([{"id": "u1", "name": "Alice"}]);
    let mut bare = customer_row(1, "Older", Some("u2"));
    bare["user_profiles"] = json!({"id": "u2", "name": "Bob"});

    Mock::given(method("GET"))
        .and(path("/rest/v1/customers"))
        .and(query_param("select", "*"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([joined, bare])))
        .mount(&server)
        .await;

    let rows = assert_ok!(remote.select_all().await);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].author_name(), Some("Alice"));
    assert_eq!(rows[1].author_name(), Some("Bob"));
}

#[tokio::test]
async fn insert_decodes_row_with_null_columns() {
    let (server, remote) = start_mock_remote().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/customers"))
        .and(body_json(json!({"name": "Acme"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([sparse_customer_row(8, "Acme", None)])))
        .expect(1)
        .mount(&server)
        .await;

    let row = assert_ok!(remote.insert(&CustomerPayload::named("Acme")).await);

    assert_eq!(row.id, EntityId::server("8"));
    assert_eq!(row.name, "Acme");
    assert_eq!(row.phone, "");
    assert_eq!(row.address, "");
    assert_eq!(row.status, "lead");
    assert_eq!(row.location(), None);
}

#[tokio::test]
async fn select_all_decodes_sparse_rows_with_embedded_profiles() {
    let (server, remote) = start_mock_remote().await;
    let mut joined = sparse_customer_row(3, "Acme", Some("u1"));
    joined["user_profiles"] = json!([{"id": "u1", "name": "Alice"}]);
    let mut orphan = sparse_customer_row(2, "Globex", None);
    orphan["user_profiles"] = json!(null);
    let mut empty_join = sparse_customer_row(1, "Initech", Some("u9"));
    empty_join["user_profiles"] = json!([]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([joined, orphan, empty_join])))
        .mount(&server)
        .await;

    let rows = assert_ok!(remote.select_all().await);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].author_name(), Some("Alice"));
    assert_eq!(rows[0].address, "");
    assert!(rows[1].author_profile.is_none());
    assert!(rows[2].author_profile.is_none());
    assert_eq!(rows[2].created_by.as_deref(), Some("u9"));
}

#[tokio::test]
async fn engine_confirms_name_only_create_over_http() {
    let (server, remote) = start_mock_remote().await;
    let db = Arc::new(assert_ok!(LocalDatabase::in_memory().await));
    let engine = SyncEngine::new(db, Arc::new(remote), SyncOptions::default());

    Mock::given(method("POST"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([sparse_customer_row(
            12,
            "Acme",
            Some(TEST_USER_ID)
        )])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([sparse_customer_row(
            12,
            "Acme",
            Some(TEST_USER_ID)
        )])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": TEST_USER_ID, "name": TEST_USER_NAME}])))
        .mount(&server)
        .await;

    let payload = CustomerPayload::named("Acme").with_created_by(TEST_USER_ID);
    let outcome = assert_ok!(engine.create(payload, true, TEST_USER_NAME).await);
    assert_confirmed!(outcome);
    assert_eq!(outcome.customer.id, EntityId::server("12"));
    assert!(assert_ok!(engine.queue().is_empty().await));

    let actor = geoledger::shared::Actor::new(TEST_USER_ID, false);
    let listed = assert_ok!(engine.fetch_all(true, Some(&actor)).await);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, EntityId::server("12"));
    assert_eq!(listed[0].author_name(), Some(TEST_USER_NAME));
}

#[tokio::test]
async fn profiles_are_fetched_in_one_filtered_request() {
    let (server, remote) = start_mock_remote().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .and(query_param("select", "id,name"))
        .and(query_param("id", "in.(\"u1\",\"u2\")"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "u1", "name": "Alice"}])))
        .expect(1)
        .mount(&server)
        .await;

    let profiles = assert_ok!(
        remote
            .select_profiles_by_ids(&["u1".to_string(), "u2".to_string()])
            .await
    );

    assert_eq!(profiles, vec![AuthorProfile::new("u1", "Alice")]);
}

#[tokio::test]
async fn empty_profile_lookup_makes_no_request() {
    let (server, remote) = start_mock_remote().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    assert!(assert_ok!(remote.select_profiles_by_ids(&[]).await).is_empty());
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let (server, remote) = start_mock_remote().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
        .mount(&server)
        .await;

    let result = remote.insert(&CustomerPayload::named("Acme")).await;

    assert_err!(result, RemoteError::Rejected { status: 409, .. });
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (server, remote) = start_mock_remote().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    assert_matches!(remote.select_all().await, Err(RemoteError::Decode { .. }));
}

#[tokio::test]
async fn engine_queues_on_server_error_and_replays_later() {
    let (server, remote) = start_mock_remote().await;
    let db = Arc::new(assert_ok!(LocalDatabase::in_memory().await));
    let engine = SyncEngine::new(db, Arc::new(remote), SyncOptions::default());

    Mock::given(method("POST"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let outcome = assert_ok!(engine.create(valid_payload("Acme"), true, TEST_USER_NAME).await);
    assert_queued!(outcome);
    assert_matches!(outcome.remote_error, Some(RemoteError::Rejected { status: 503, .. }));

    Mock::given(method("POST"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([customer_row(11, "Acme", Some(TEST_USER_ID))])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([customer_row(11, "Acme", Some(TEST_USER_ID))])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": TEST_USER_ID, "name": TEST_USER_NAME}])))
        .expect(1)
        .mount(&server)
        .await;

    let report = assert_ok!(engine.replay(true).await);

    assert_eq!(report.replayed, 1);
    assert!(report.refetched);
    let actor = geoledger::shared::Actor::new(TEST_USER_ID, false);
    let listed = assert_ok!(engine.fetch_all(false, Some(&actor)).await);
    assert_eq!(listed[0].id, EntityId::server("11"));
    assert_eq!(listed[0].author_name(), Some(TEST_USER_NAME));
}
