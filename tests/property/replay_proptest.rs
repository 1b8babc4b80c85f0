//! Property-based tests for offline replay
//!
//! Applying a sequence of writes offline and replaying it must leave the
//! remote store in the same state as applying the same writes online.

use crate::common::*;
use geoledger::client::remote::{MemoryRemote, RemoteOp};
use geoledger::client::SyncEngine;
use geoledger::shared::{CustomerPayload, EntityId, RemoteError};
use proptest::prelude::*;
use std::sync::Arc;

const STATUSES: [&str; 4] = ["lead", "active", "won", "lost"];

#[derive(Debug, Clone)]
enum Step {
    Create,
    Update(usize, usize),
    Delete(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => Just(Step::Create),
        2 => (any::<usize>(), 0..STATUSES.len()).prop_map(|(k, s)| Step::Update(k, s)),
        1 => any::<usize>().prop_map(Step::Delete),
    ]
}

/// Apply `steps` through `engine`, addressing only customers still alive
async fn apply(engine: &SyncEngine, steps: &[Step], online: bool) {
    let mut live: Vec<EntityId> = Vec::new();
    let mut created = 0;

    for step in steps {
        match step {
            Step::Create => {
                created += 1;
                let payload = CustomerPayload::named(format!("c{}", created));
                let outcome = engine
                    .create(payload, online, TEST_USER_NAME)
                    .await
                    .expect("create");
                live.push(outcome.customer.id);
            }
            Step::Update(k, s) if !live.is_empty() => {
                let id = live[k % live.len()].clone();
                engine
                    .update(&id, CustomerPayload::default().with_status(STATUSES[*s]), online, TEST_USER_NAME)
                    .await
                    .expect("update");
            }
            Step::Delete(k) if !live.is_empty() => {
                let id = live.remove(k % live.len());
                engine.delete(&id, online).await.expect("delete");
            }
            _ => {}
        }
    }
}

fn remote_state(remote: &MemoryRemote) -> Vec<(String, String)> {
    let mut rows: Vec<_> = remote
        .rows()
        .into_iter()
        .map(|c| (c.name, c.status))
        .collect();
    rows.sort();
    rows
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn replay_matches_online_application(
        steps in prop::collection::vec(step(), 0..16),
        insert_failures in 0..3usize,
        update_failures in 0..3usize,
        delete_failures in 0..2usize,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let online = TestClient::new().await;
            apply(&online.engine, &steps, true).await;

            let offline = TestClient::new().await;
            apply(&offline.engine, &steps, false).await;
            prop_assert_eq!(offline.remote.rows().len(), 0);

            let transient = RemoteError::transport("flaky network");
            offline.remote.fail_next(RemoteOp::Insert, insert_failures, transient.clone());
            offline.remote.fail_next(RemoteOp::Update, update_failures, transient.clone());
            offline.remote.fail_next(RemoteOp::Delete, delete_failures, transient);

            let mut passes = 0;
            while !offline.engine.queue().is_empty().await.unwrap() {
                passes += 1;
                prop_assert!(passes <= 16, "queue did not drain");
                offline.engine.replay(true).await.unwrap();
            }

            prop_assert_eq!(remote_state(&offline.remote), remote_state(&online.remote));

            // The replica converges on the remote store, with no temp ids left
            let actor = offline.actor();
            let local = offline.engine.fetch_all(false, Some(&actor)).await.unwrap();
            prop_assert!(local.iter().all(|c| !c.id.is_temp()));
            let mut local_state: Vec<_> = local.into_iter().map(|c| (c.name, c.status)).collect();
            local_state.sort();
            prop_assert_eq!(local_state, remote_state(&offline.remote));
            Ok(())
        })?;
    }

    #[test]
    fn second_replay_sends_nothing(
        steps in prop::collection::vec(step(), 1..12),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let client = TestClient::new().await;
            apply(&client.engine, &steps, false).await;

            client.engine.replay(true).await.unwrap();
            let writes = |r: &Arc<MemoryRemote>| {
                r.calls(RemoteOp::Insert) + r.calls(RemoteOp::Update) + r.calls(RemoteOp::Delete)
            };
            let after_first = writes(&client.remote);
            let rows_after_first = remote_state(&client.remote);

            let report = client.engine.replay(true).await.unwrap();

            prop_assert_eq!(report.attempted, 0);
            prop_assert_eq!(writes(&client.remote), after_first);
            prop_assert_eq!(remote_state(&client.remote), rows_after_first);
            Ok(())
        })?;
    }
}
