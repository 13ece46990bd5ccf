//! Shared test doubles for invoker integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pricewatch_core::catalog::{Catalog, Target};
use pricewatch_core::job::JobSubmission;
use pricewatch_crawler::{ExtractError, PageFetcher};
use pricewatch_invoker::{JobTransport, TransportError, TransportResponse};
use pricewatch_storage::{CatalogSource, StorageError};

/// Build a catalog target writing to `store`.
pub fn target(job_name: &str, site_url: &str, selector: &str, store: &str) -> Target {
    Target {
        job_name: job_name.to_string(),
        site_url: site_url.to_string(),
        html_selector: selector.to_string(),
        destination_store: store.to_string(),
        alert_threshold: Some(serde_json::json!(10)),
        price_delta_unit: Some(serde_json::json!("percent")),
    }
}

// ---------------------------------------------------------------------------
// In-memory catalog source
// ---------------------------------------------------------------------------

/// Serves one fixed catalog, or fails as if the object were missing.
pub struct StaticCatalog {
    catalog: Option<Catalog>,
}

impl StaticCatalog {
    pub fn new(sites: Vec<Target>) -> Self {
        Self {
            catalog: Some(Catalog { sites }),
        }
    }

    pub fn missing() -> Self {
        Self { catalog: None }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load_catalog(&self, name: &str) -> Result<Catalog, StorageError> {
        self.catalog.clone().ok_or_else(|| StorageError::NotFound {
            name: name.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

/// What the scripted transport does for one job.
#[derive(Debug, Clone)]
pub enum Script {
    /// Answer with `status` after `delay`.
    Respond { status: i32, delay: Duration },
    /// Answer with a function error.
    FunctionError { status: i32, kind: String },
    /// Fail to invoke.
    Fail(String),
    /// Never answer.
    Hang,
}

/// Plays back a per-job script and records what it saw.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    submitted: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn with(mut self, job_name: &str, script: Script) -> Self {
        self.scripts.insert(job_name.to_string(), script);
        self
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobTransport for ScriptedTransport {
    async fn submit(&self, submission: &JobSubmission) -> Result<TransportResponse, TransportError> {
        self.submitted
            .lock()
            .unwrap()
            .push(submission.job_name.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self
            .scripts
            .get(&submission.job_name)
            .cloned()
            .unwrap_or(Script::Respond {
                status: 200,
                delay: Duration::ZERO,
            });

        let result = match script {
            Script::Respond { status, delay } => {
                tokio::time::sleep(delay).await;
                Ok(TransportResponse {
                    status_code: status,
                    function_error: None,
                    payload: Some("{}".to_string()),
                })
            }
            Script::FunctionError { status, kind } => Ok(TransportResponse {
                status_code: status,
                function_error: Some(kind),
                payload: None,
            }),
            Script::Fail(message) => Err(TransportError::Invoke(message)),
            Script::Hang => std::future::pending().await,
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ---------------------------------------------------------------------------
// Static page fetcher
// ---------------------------------------------------------------------------

/// Serves fixed pages by URL; unknown URLs fail like an HTTP 404.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExtractError> {
        self.pages
            .get(url)
            .map(|body| body.as_bytes().to_vec())
            .ok_or_else(|| ExtractError::Fetch {
                url: url.to_string(),
                message: "HTTP 404".to_string(),
            })
    }
}
