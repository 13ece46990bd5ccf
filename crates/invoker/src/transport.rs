//! Seam between the orchestrator and whatever executes a crawl job.

use async_trait::async_trait;
use pricewatch_core::job::JobSubmission;

/// What the transport reports back for one submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Backend-defined status code.
    pub status_code: i32,
    /// Set when the job ran but reported a failure.
    pub function_error: Option<String>,
    /// Response body, unused beyond diagnostics.
    pub payload: Option<String>,
}

impl TransportResponse {
    /// Failure description suitable for a job report, if any.
    pub fn failure(&self) -> Option<String> {
        let kind = self.function_error.as_deref()?;
        Some(match self.payload.as_deref() {
            Some(body) if !body.is_empty() => format!("{kind}: {body}"),
            _ => kind.to_string(),
        })
    }
}

/// Errors delivering a job to the transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The submission could not be serialised.
    #[error("Failed to encode job submission: {0}")]
    Encode(#[from] serde_json::Error),

    /// The transport could not invoke the job.
    #[error("Job invocation failed: {0}")]
    Invoke(String),

    /// No response arrived within the transport time budget.
    #[error("Job invocation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Submits one job and waits for its status.
#[async_trait]
pub trait JobTransport: Send + Sync {
    async fn submit(&self, submission: &JobSubmission) -> Result<TransportResponse, TransportError>;
}
