//! Crawl event handling.
//!
//! A crawl event is the JSON job description produced by the invoker:
//! `{job_name, site_url, html_query, bucket_name}`. [`CrawlService`]
//! validates it, resolves the execution log for `bucket_name`, and runs
//! the crawl. Logs are cached per store so concurrent jobs writing to the
//! same store share one latest-state lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pricewatch_core::job::JobSubmission;
use pricewatch_core::naming::{is_valid_job_name, is_valid_store_name};
use pricewatch_storage::StoreProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crawler::Crawler;
use crate::error::CrawlError;
use crate::execution_log::{ExecutionLog, LogSettings};
use crate::extract::Extractor;

/// Keys a crawl event must carry, checked in this order.
const REQUIRED_KEYS: [&str; 4] = ["bucket_name", "job_name", "site_url", "html_query"];

/// Result returned for a successful crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub site_url: String,
    pub price: String,
}

/// Runs crawl jobs against stores resolved through a [`StoreProvider`].
pub struct CrawlService {
    provider: StoreProvider,
    extractor: Extractor,
    settings: LogSettings,
    logs: Mutex<HashMap<String, ExecutionLog>>,
}

impl CrawlService {
    pub fn new(provider: StoreProvider, extractor: Extractor, settings: LogSettings) -> Self {
        Self {
            provider,
            extractor,
            settings,
            logs: Mutex::new(HashMap::new()),
        }
    }

    /// Validate a raw event and run it.
    pub async fn handle_event(&self, event: &Value) -> Result<CrawlOutcome, CrawlError> {
        let submission = parse_event(event)?;
        self.run(&submission).await
    }

    /// Run one validated submission.
    pub async fn run(&self, submission: &JobSubmission) -> Result<CrawlOutcome, CrawlError> {
        if !is_valid_job_name(&submission.job_name) {
            return Err(CrawlError::InvalidEvent(format!(
                "job_name '{}' cannot name a history object",
                submission.job_name
            )));
        }
        if !is_valid_store_name(&submission.destination_store) {
            return Err(CrawlError::InvalidEvent(format!(
                "bucket_name '{}' must be a bare store name without path components",
                submission.destination_store
            )));
        }

        let log = self.execution_log(&submission.destination_store);
        let crawler = Crawler::new(self.extractor.clone(), log);

        let price = crawler
            .grab_price(
                &submission.job_name,
                &submission.site_url,
                &submission.html_selector,
            )
            .await?;

        Ok(CrawlOutcome {
            site_url: submission.site_url.clone(),
            price,
        })
    }

    /// The shared execution log for `store`, created on first use.
    pub fn execution_log(&self, store: &str) -> ExecutionLog {
        let mut logs = self
            .logs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        logs.entry(store.to_string())
            .or_insert_with(|| ExecutionLog::new(self.provider.log_storage(store), self.settings))
            .clone()
    }
}

/// Check required keys and decode a crawl event.
pub fn parse_event(event: &Value) -> Result<JobSubmission, CrawlError> {
    let object = event
        .as_object()
        .ok_or_else(|| CrawlError::InvalidEvent("event must be a JSON object".into()))?;

    for key in REQUIRED_KEYS {
        if !object.contains_key(key) {
            return Err(CrawlError::InvalidEvent(format!(
                "The '{key}' key is missing from the event"
            )));
        }
    }

    serde_json::from_value(event.clone()).map_err(|e| CrawlError::InvalidEvent(e.to_string()))
}
