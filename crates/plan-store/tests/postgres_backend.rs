//! `PgKeyValueStore` against a live database.
//!
//! Skipped unless `DATABASE_URL` points at a PostgreSQL instance the test
//! may create the `plan_kv` table in.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use plan_core::ObjectId;
use plan_store::{KeyValueStore, PgKeyValueStore, PlanError, PlanStore, ReadOutcome};
use serde_json::json;

async fn connect() -> Option<PgKeyValueStore> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(PgKeyValueStore::connect(&url).await.expect("database reachable"))
}

fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{}-{nanos}", std::process::id())
}

#[tokio::test]
async fn slot_operations() {
    let Some(store) = connect().await else {
        return;
    };
    let key = unique("kv");

    assert_eq!(store.get(&key).await.unwrap(), None);
    assert!(store.set_if_absent(&key, b"one", None).await.unwrap());
    assert!(!store.set_if_absent(&key, b"two", None).await.unwrap());
    assert_eq!(store.get(&key).await.unwrap(), Some(b"one".to_vec()));

    store.set(&key, b"three", None).await.unwrap();
    assert_eq!(store.get(&key).await.unwrap(), Some(b"three".to_vec()));

    let removed = store
        .delete(&[key.clone(), format!("{key}:missing")])
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.get(&key).await.unwrap(), None);
    store.ping().await.unwrap();
}

#[tokio::test]
async fn expired_rows_are_reclaimed() {
    let Some(store) = connect().await else {
        return;
    };
    let key = unique("ttl");

    store
        .set(&key, b"old", Some(Duration::from_millis(50)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.get(&key).await.unwrap(), None);
    assert!(store.set_if_absent(&key, b"new", None).await.unwrap());
    assert_eq!(store.get(&key).await.unwrap(), Some(b"new".to_vec()));
    store.delete(&[key]).await.unwrap();
}

#[tokio::test]
async fn plan_lifecycle() {
    let Some(store) = connect().await else {
        return;
    };
    let plans = PlanStore::new(Arc::new(store));
    let id = ObjectId::new(unique("plan")).unwrap();
    let doc = json!({"objectId": id.as_str(), "body": "x"});

    let created = plans.create(&id, &doc).await.unwrap();
    assert!(matches!(
        plans.create(&id, &doc).await.unwrap_err(),
        PlanError::AlreadyExists(_)
    ));
    assert_eq!(
        plans.read(&id, Some(created.tag.as_str())).await.unwrap(),
        ReadOutcome::NotModified { tag: created.tag }
    );
    plans.delete(&id).await.unwrap();
    assert!(matches!(
        plans.read(&id, None).await.unwrap_err(),
        PlanError::NotFound(_)
    ));
}
