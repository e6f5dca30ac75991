//! Integration tests for the file-backed store.

use chrono::{Duration, TimeZone, Utc};
use lifeline_common::{ContainerId, EventRecord, EventType, LifelinePaths, Preferences};
use lifeline_store::{AuditQuery, AuditStore, EntityRegistry, FileStore, MAX_QUERY_LIMIT};
use proptest::prelude::*;
use tempfile::tempdir;

fn record(container: &str, seconds: i64) -> EventRecord {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    EventRecord::new(
        ContainerId::new(container).unwrap(),
        container,
        EventType::StoppedFailed,
        format!("Container stopped with exit code {seconds}"),
    )
    .at(base + Duration::seconds(seconds))
}

#[test_log::test(tokio::test)]
async fn query_caps_at_one_hundred_newest_first() {
    let temp = tempdir().unwrap();
    let store = FileStore::open(LifelinePaths::with_root(temp.path())).unwrap();

    for i in 0..150 {
        store.append(record("web-1", i)).await.unwrap();
    }

    let records = store.query(AuditQuery::recent()).await.unwrap();
    assert_eq!(records.len(), 100);
    assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    // The 100 most recent: seconds 149 down to 50.
    assert_eq!(records[0].message, "Container stopped with exit code 149");
    assert_eq!(records[99].message, "Container stopped with exit code 50");
    assert_eq!(store.count().await.unwrap(), 150);
}

#[test_log::test(tokio::test)]
async fn out_of_order_appends_are_sorted() {
    let temp = tempdir().unwrap();
    let store = FileStore::open(LifelinePaths::with_root(temp.path())).unwrap();

    for i in [5, 1, 9, 3] {
        store.append(record("web-1", i)).await.unwrap();
    }

    let records = store
        .query(AuditQuery::recent().with_limit(2))
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message, "Container stopped with exit code 9");
    assert_eq!(records[1].message, "Container stopped with exit code 5");
}

#[test_log::test(tokio::test)]
async fn entity_filter_applies_before_the_limit() {
    let temp = tempdir().unwrap();
    let store = FileStore::open(LifelinePaths::with_root(temp.path())).unwrap();

    for i in 0..120 {
        let container = if i % 4 == 0 { "db" } else { "web-1" };
        store.append(record(container, i)).await.unwrap();
    }

    let db = ContainerId::new("db").unwrap();
    let records = store.query(AuditQuery::for_entity(db.clone())).await.unwrap();
    assert_eq!(records.len(), 30);
    assert!(records.iter().all(|r| r.entity_id == db));
    assert_eq!(records[0].message, "Container stopped with exit code 116");

    let records = store
        .query(AuditQuery::for_entity(db).with_limit(3))
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].message, "Container stopped with exit code 108");
}

#[test_log::test(tokio::test)]
async fn store_survives_reopen() {
    let temp = tempdir().unwrap();
    let id = ContainerId::new("web-1").unwrap();
    let prefs = Preferences {
        notify_on_success: true,
        notify_on_failure: true,
    };

    {
        let store = FileStore::open(LifelinePaths::with_root(temp.path())).unwrap();
        store.upsert(&id, "web-1", "nginx:latest").await.unwrap();
        store.set_preferences(&id, prefs).await.unwrap();
        store.append(record("web-1", 1)).await.unwrap();
    }

    let store = FileStore::open(LifelinePaths::with_root(temp.path())).unwrap();
    let entity = store.find(&id).await.unwrap().unwrap();
    assert_eq!(entity.preferences, prefs);
    assert_eq!(store.query(AuditQuery::for_entity(id)).await.unwrap().len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn query_never_exceeds_limit(
        offsets in prop::collection::vec(0i64..10_000, 0..180),
        limit in 0usize..250,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let temp = tempdir().unwrap();
            let store = FileStore::open(LifelinePaths::with_root(temp.path())).unwrap();
            for offset in &offsets {
                store.append(record("web-1", *offset)).await.unwrap();
            }

            let records = store
                .query(AuditQuery::recent().with_limit(limit))
                .await
                .unwrap();

            let expected = offsets.len().min(limit).min(MAX_QUERY_LIMIT);
            assert_eq!(records.len(), expected);
            assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        });
    }
}
