//! Records exchanged between the orchestrator and the job transport.

use serde::{Deserialize, Serialize};

use crate::catalog::Target;

/// HTTP-style status reported when a job completed normally.
pub const STATUS_OK: i32 = 200;

/// Status reported when the transport could not deliver or run the job.
pub const STATUS_TRANSPORT_FAILED: i32 = 502;

/// Status reported when the transport call exceeded its time budget.
pub const STATUS_TRANSPORT_TIMEOUT: i32 = 504;

/// The subset of a [`Target`] handed to the transport for one crawl.
///
/// Serialises with the catalog's wire names so the remote side can read
/// the same keys the catalog uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSubmission {
    pub job_name: String,
    pub site_url: String,
    #[serde(rename = "html_query")]
    pub html_selector: String,
    #[serde(rename = "bucket_name")]
    pub destination_store: String,
}

impl From<&Target> for JobSubmission {
    fn from(target: &Target) -> Self {
        Self {
            job_name: target.job_name.clone(),
            site_url: target.site_url.clone(),
            html_selector: target.html_selector.clone(),
            destination_store: target.destination_store.clone(),
        }
    }
}

/// Outcome of one dispatched job, in catalog order within a run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub job_name: String,
    /// Transport-defined status code.
    pub status: i32,
    /// Failure description when the transport or the job reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobReport {
    /// Whether the job ran and reported success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.error.is_none()
    }
}
