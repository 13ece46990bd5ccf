//! Integration tests for [`ExecutionLog`]: history append, latest-state
//! upsert, the disable switch, and latest-state updates from concurrent
//! writers sharing a log or only sharing its storage.

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pricewatch_core::naming::{history_object_name, LATEST_STATE_OBJECT};
use pricewatch_crawler::{ExecutionLog, LogSettings};
use pricewatch_storage::{FsLogStorage, FsObjectStore};
use tempfile::TempDir;

use common::CountingStorage;

fn log_over(storage: &Arc<CountingStorage>) -> ExecutionLog {
    ExecutionLog::new(storage.clone(), LogSettings::default())
}

#[tokio::test]
async fn recording_twice_appends_history_and_updates_latest() {
    let storage = Arc::new(CountingStorage::default());
    let log = log_over(&storage);

    let first = Utc.with_ymd_and_hms(2024, 12, 1, 8, 0, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2024, 12, 2, 8, 0, 0).unwrap();
    log.record_at("december", "95.50", first).await.unwrap();
    log.record_at("december", "95.50", second).await.unwrap();

    let history = log.history("december").await.unwrap();
    assert_eq!(history.len(), 2);

    let latest = log.latest_state().await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].job_name, "december");
    assert_eq!(latest[0].price, "95.50");
    assert_eq!(latest[0].executed_at, "2024-12-02T08:00:00.000000Z");
    assert_eq!(latest[0].executed_at, history[1].executed_at);
}

#[tokio::test]
async fn wall_clock_record_uses_one_timestamp_for_both_objects() {
    let storage = Arc::new(CountingStorage::default());
    let log = log_over(&storage);

    log.record("december", "90.00").await.unwrap();

    let history = log.history("december").await.unwrap();
    let latest = log.latest_for("december").await.unwrap().unwrap();
    assert_eq!(history[0].executed_at, latest.executed_at);
}

#[tokio::test]
async fn two_jobs_keep_separate_histories_and_positions() {
    let storage = Arc::new(CountingStorage::default());
    let log = log_over(&storage);

    log.record("december", "90.00").await.unwrap();
    log.record("january", "80.00").await.unwrap();
    log.record("december", "91.00").await.unwrap();
    log.record("january", "81.00").await.unwrap();

    assert_eq!(log.history("december").await.unwrap().len(), 2);
    assert_eq!(log.history("january").await.unwrap().len(), 2);
    assert!(storage.object(&history_object_name("december")).is_some());
    assert!(storage.object(&history_object_name("january")).is_some());

    let latest = log.latest_state().await.unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].job_name, "december");
    assert_eq!(latest[0].price, "91.00");
    assert_eq!(latest[1].job_name, "january");
    assert_eq!(latest[1].price, "81.00");
}

#[tokio::test]
async fn history_preserves_prior_entries() {
    let storage = Arc::new(CountingStorage::default());
    let log = log_over(&storage);

    for price in ["90.00", "92.00", "88.50"] {
        log.record("white-tshirt", price).await.unwrap();
    }

    let prices: Vec<String> = log
        .history("white-tshirt")
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.price)
        .collect();
    assert_eq!(prices, vec!["90.00", "92.00", "88.50"]);
}

#[tokio::test]
async fn job_that_never_ran_has_no_latest_entry() {
    let storage = Arc::new(CountingStorage::default());
    let log = log_over(&storage);

    log.record("december", "90.00").await.unwrap();

    assert!(log.latest_for("january").await.unwrap().is_none());
    assert!(log.history("january").await.unwrap().is_empty());
}

#[tokio::test]
async fn disabled_log_touches_no_storage() {
    let storage = Arc::new(CountingStorage::default());
    let log = ExecutionLog::new(storage.clone(), LogSettings { enabled: false });

    log.record("december", "95.50").await.unwrap();
    log.record("january", "80.00").await.unwrap();

    assert_eq!(storage.calls(), 0);
    assert_eq!(storage.saves(), 0);
}

#[tokio::test]
async fn enabled_record_is_two_read_modify_write_cycles() {
    let storage = Arc::new(CountingStorage::default());
    let log = log_over(&storage);

    log.record("december", "95.50").await.unwrap();

    assert_eq!(storage.loads(), 2);
    assert_eq!(storage.saves(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_jobs_do_not_lose_latest_state_updates() {
    let storage = Arc::new(CountingStorage::default());
    let log = log_over(&storage);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let log = log.clone();
            tokio::spawn(async move { log.record(&format!("job-{i}"), "10.00").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let latest = storage.object(LATEST_STATE_OBJECT).unwrap();
    assert_eq!(latest.len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_logs_over_one_storage_do_not_lose_updates() {
    let storage = Arc::new(CountingStorage::default());

    // A fresh ExecutionLog per job, as separate processes would have.
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let log = log_over(&storage);
            tokio::spawn(async move { log.record(&format!("job-{i}"), "10.00").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let latest = storage.object(LATEST_STATE_OBJECT).unwrap();
    assert_eq!(latest.len(), 16);
}

#[tokio::test]
async fn stale_latest_state_write_is_retried() {
    let storage = Arc::new(CountingStorage::default());
    let first = log_over(&storage);
    let second = log_over(&storage);

    let (a, b) = tokio::join!(
        first.record("december", "90.00"),
        second.record("january", "80.00")
    );
    a.unwrap();
    b.unwrap();

    let latest = first.latest_state().await.unwrap();
    let jobs: Vec<&str> = latest.iter().map(|entry| entry.job_name.as_str()).collect();
    assert_eq!(latest.len(), 2);
    assert!(jobs.contains(&"december"));
    assert!(jobs.contains(&"january"));
    // Every rejected write was followed by another cycle.
    assert_eq!(storage.saves(), 4 + storage.conflicts());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_logs_over_one_directory_do_not_lose_updates() {
    let dir = TempDir::new().unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let storage = Arc::new(FsLogStorage::new(FsObjectStore::new(dir.path())));
            let log = ExecutionLog::new(storage, LogSettings::default());
            tokio::spawn(async move { log.record(&format!("job-{i}"), "10.00").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let latest: Vec<serde_json::Value> = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(LATEST_STATE_OBJECT)).unwrap(),
    )
    .unwrap();
    assert_eq!(latest.len(), 16);
    assert!(!dir.path().join(format!("{LATEST_STATE_OBJECT}.lock")).exists());
}

#[tokio::test]
async fn filesystem_backend_writes_wire_format() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FsLogStorage::new(FsObjectStore::new(dir.path())));
    let log = ExecutionLog::new(storage, LogSettings::default());

    let at = Utc.with_ymd_and_hms(2024, 12, 1, 8, 0, 0).unwrap();
    log.record_at("december", "95.50", at).await.unwrap();

    let latest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(LATEST_STATE_OBJECT)).unwrap(),
    )
    .unwrap();
    assert_eq!(
        latest,
        serde_json::json!([
            {"job_name": "december", "executed": "2024-12-01T08:00:00.000000Z", "price": "95.50"}
        ])
    );

    let history: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("december.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        history,
        serde_json::json!([{"executed": "2024-12-01T08:00:00.000000Z", "price": "95.50"}])
    );
}
