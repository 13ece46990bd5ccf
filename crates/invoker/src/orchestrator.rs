//! Catalog-wide job dispatch.
//!
//! [`Orchestrator::run`] loads the catalog, submits one job per target
//! through the [`JobTransport`], and returns one [`JobReport`] per target
//! in catalog order. Jobs run concurrently up to `max_concurrency`;
//! `buffered` yields results in submission order, so completion order
//! never leaks into the report. A failing or timed-out job still produces
//! its report entry. Only a catalog load failure aborts the run.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use pricewatch_core::job::{
    JobReport, JobSubmission, STATUS_TRANSPORT_FAILED, STATUS_TRANSPORT_TIMEOUT,
};
use pricewatch_core::naming::CATALOG_OBJECT;
use pricewatch_storage::{CatalogSource, StorageError};

use crate::transport::{JobTransport, TransportError};

/// Default number of jobs in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default time budget of one transport call.
pub const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The catalog could not be loaded or failed validation.
    #[error("Failed to load catalog: {0}")]
    Catalog(#[from] StorageError),

    /// The invoke event is missing a key or is not an object.
    #[error("Invalid invoke event: {0}")]
    InvalidEvent(String),

    /// The report could not be serialised.
    #[error("Failed to encode run report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Dispatch limits for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Jobs in flight at once; values below 1 are treated as 1.
    pub max_concurrency: usize,
    /// Time budget of each transport call.
    pub transport_timeout: Duration,
    /// Catalog object name inside the catalog store.
    pub catalog_object: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            transport_timeout: DEFAULT_TRANSPORT_TIMEOUT,
            catalog_object: CATALOG_OBJECT.to_string(),
        }
    }
}

/// Loads the catalog and fans jobs out to a transport.
pub struct Orchestrator {
    catalog: Arc<dyn CatalogSource>,
    transport: Arc<dyn JobTransport>,
    settings: DispatchSettings,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        transport: Arc<dyn JobTransport>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            catalog,
            transport,
            settings,
        }
    }

    /// Dispatch every catalog target and collect their reports.
    pub async fn run(&self) -> Result<Vec<JobReport>, RunError> {
        let catalog = self
            .catalog
            .load_catalog(&self.settings.catalog_object)
            .await?;

        tracing::info!(
            jobs = catalog.len(),
            max_concurrency = self.settings.max_concurrency,
            "Dispatching crawl jobs",
        );

        let reports: Vec<JobReport> = stream::iter(catalog.iter().map(JobSubmission::from))
            .map(|submission| self.dispatch(submission))
            .buffered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        let failed = reports.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            jobs = reports.len(),
            failed,
            "Run complete",
        );

        Ok(reports)
    }

    async fn dispatch(&self, submission: JobSubmission) -> JobReport {
        let timeout = self.settings.transport_timeout;
        let result = match tokio::time::timeout(timeout, self.transport.submit(&submission)).await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                timeout_secs: timeout.as_secs(),
            }),
        };

        match result {
            Ok(response) => {
                let error = response.failure();
                if let Some(error) = &error {
                    tracing::warn!(
                        job_name = %submission.job_name,
                        status = response.status_code,
                        error = %error,
                        "Job reported failure",
                    );
                } else {
                    tracing::info!(
                        job_name = %submission.job_name,
                        status = response.status_code,
                        "Job finished",
                    );
                }
                JobReport {
                    job_name: submission.job_name,
                    status: response.status_code,
                    error,
                }
            }
            Err(e) => {
                let status = match e {
                    TransportError::Timeout { .. } => STATUS_TRANSPORT_TIMEOUT,
                    _ => STATUS_TRANSPORT_FAILED,
                };
                tracing::warn!(
                    job_name = %submission.job_name,
                    status,
                    error = %e,
                    "Job transport failed",
                );
                JobReport {
                    job_name: submission.job_name,
                    status,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
