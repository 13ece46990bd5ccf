//! End-to-end crawl events against the local storage backend.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use pricewatch_core::naming::LATEST_STATE_OBJECT;
use pricewatch_crawler::{CrawlError, CrawlService, Extractor, LogSettings};
use pricewatch_storage::StoreProvider;
use serde_json::json;
use tempfile::TempDir;

use common::{StaticFetcher, SHIRT_PAGE, SHIRT_PRICE_SELECTOR};

const SHIRT_URL: &str = "https://shop.example.com/tshirt.html";

fn service(dir: &TempDir, settings: LogSettings) -> CrawlService {
    let fetcher = StaticFetcher::default().with_page(SHIRT_URL, SHIRT_PAGE);
    CrawlService::new(
        StoreProvider::local(dir.path()),
        Extractor::new(Arc::new(fetcher)),
        settings,
    )
}

fn event(selector: &str) -> serde_json::Value {
    json!({
        "job_name": "white-tshirt",
        "site_url": SHIRT_URL,
        "html_query": selector,
        "bucket_name": "price-logs",
    })
}

#[tokio::test]
async fn successful_event_returns_price_and_writes_both_objects() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, LogSettings::default());

    let outcome = service
        .handle_event(&event(SHIRT_PRICE_SELECTOR))
        .await
        .unwrap();
    assert_eq!(outcome.site_url, SHIRT_URL);
    assert_eq!(outcome.price, "105.00");

    let store = dir.path().join("price-logs");
    assert!(store.join("white-tshirt.json").is_file());
    assert!(store.join(LATEST_STATE_OBJECT).is_file());
}

#[tokio::test]
async fn failed_extraction_records_nothing() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, LogSettings::default());

    let err = service.handle_event(&event("span.h-size")).await.unwrap_err();
    assert_matches!(err, CrawlError::Extract(_));
    assert!(!dir.path().join("price-logs").exists());
}

#[tokio::test]
async fn disabled_logging_still_returns_price() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, LogSettings { enabled: false });

    let outcome = service
        .handle_event(&event(SHIRT_PRICE_SELECTOR))
        .await
        .unwrap();
    assert_eq!(outcome.price, "105.00");
    assert!(!dir.path().join("price-logs").exists());
}

#[tokio::test]
async fn missing_key_is_rejected_before_fetching() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, LogSettings::default());

    let mut incomplete = event(SHIRT_PRICE_SELECTOR);
    incomplete.as_object_mut().unwrap().remove("html_query");

    let err = service.handle_event(&incomplete).await.unwrap_err();
    assert_matches!(err, CrawlError::InvalidEvent(ref msg) if msg.contains("html_query"));
}

#[tokio::test]
async fn path_like_job_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, LogSettings::default());

    let mut bad = event(SHIRT_PRICE_SELECTOR);
    bad["job_name"] = json!("../escape");

    assert_matches!(
        service.handle_event(&bad).await,
        Err(CrawlError::InvalidEvent(_))
    );
}

#[tokio::test]
async fn path_like_bucket_name_cannot_leave_the_local_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("root");
    let fetcher = StaticFetcher::default().with_page(SHIRT_URL, SHIRT_PAGE);
    let service = CrawlService::new(
        StoreProvider::local(&root),
        Extractor::new(Arc::new(fetcher)),
        LogSettings::default(),
    );

    let outside = dir.path().join("outside");
    for bucket in [
        "../outside".to_string(),
        outside.display().to_string(),
        "nested/store".to_string(),
    ] {
        let mut bad = event(SHIRT_PRICE_SELECTOR);
        bad["bucket_name"] = json!(bucket);
        assert_matches!(
            service.handle_event(&bad).await,
            Err(CrawlError::InvalidEvent(ref msg)) if msg.contains("bucket_name")
        );
    }

    assert!(!outside.exists());
    assert!(!root.exists());
}

#[tokio::test]
async fn same_store_shares_one_execution_log() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, LogSettings::default());

    service
        .handle_event(&event(SHIRT_PRICE_SELECTOR))
        .await
        .unwrap();
    service
        .handle_event(&event(SHIRT_PRICE_SELECTOR))
        .await
        .unwrap();

    let log = service.execution_log("price-logs");
    assert_eq!(log.history("white-tshirt").await.unwrap().len(), 2);
    assert_eq!(log.latest_state().await.unwrap().len(), 1);
}
