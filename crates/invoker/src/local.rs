//! In-process job transport.
//!
//! Runs the crawl directly through a shared [`CrawlService`], so every job
//! writing to the same store goes through one execution log and its
//! latest-state lock. Crawl failures become HTTP-style status codes
//! rather than transport errors.

use std::sync::Arc;

use async_trait::async_trait;
use pricewatch_core::job::{JobSubmission, STATUS_OK};
use pricewatch_crawler::{CrawlError, CrawlService, ExtractError};

use crate::transport::{JobTransport, TransportError, TransportResponse};

/// Status of a submission that could not be run as given.
pub const STATUS_INVALID: i32 = 400;
/// Status of a page whose price node or price text was not unique.
pub const STATUS_UNPROCESSABLE: i32 = 422;
/// Status of a failed page fetch.
pub const STATUS_FETCH_FAILED: i32 = 502;
/// Status of a timed-out page fetch.
pub const STATUS_FETCH_TIMEOUT: i32 = 504;
/// Status of an execution log failure.
pub const STATUS_STORAGE_FAILED: i32 = 500;

/// Executes jobs in the current process.
#[derive(Clone)]
pub struct LocalTransport {
    service: Arc<CrawlService>,
}

impl LocalTransport {
    pub fn new(service: Arc<CrawlService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl JobTransport for LocalTransport {
    async fn submit(&self, submission: &JobSubmission) -> Result<TransportResponse, TransportError> {
        match self.service.run(submission).await {
            Ok(outcome) => Ok(TransportResponse {
                status_code: STATUS_OK,
                function_error: None,
                payload: Some(serde_json::to_string(&outcome)?),
            }),
            Err(e) => Ok(TransportResponse {
                status_code: status_for(&e),
                function_error: Some(e.to_string()),
                payload: None,
            }),
        }
    }
}

/// Status code reported for a failed crawl.
pub fn status_for(error: &CrawlError) -> i32 {
    match error {
        CrawlError::InvalidEvent(_) => STATUS_INVALID,
        CrawlError::Extract(ExtractError::Selector { .. } | ExtractError::Extraction { .. }) => {
            STATUS_UNPROCESSABLE
        }
        CrawlError::Extract(ExtractError::Fetch { .. }) => STATUS_FETCH_FAILED,
        CrawlError::Extract(ExtractError::Timeout { .. }) => STATUS_FETCH_TIMEOUT,
        CrawlError::Log(_) => STATUS_STORAGE_FAILED,
    }
}
