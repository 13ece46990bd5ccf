//! AWS Lambda job transport.
//!
//! Each job is a synchronous (`RequestResponse`) invocation of the crawl
//! function with the JSON-encoded [`JobSubmission`] as payload.

use async_trait::async_trait;
use aws_sdk_lambda::config::Region;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use pricewatch_core::job::JobSubmission;

use crate::transport::{JobTransport, TransportError, TransportResponse};

/// Default name of the crawl function.
pub const DEFAULT_FUNCTION_NAME: &str = "grab-price";

/// Invokes a Lambda function per job.
#[derive(Debug, Clone)]
pub struct LambdaTransport {
    client: aws_sdk_lambda::Client,
    function_name: String,
}

impl LambdaTransport {
    pub fn new(client: aws_sdk_lambda::Client, function_name: impl Into<String>) -> Self {
        Self {
            client,
            function_name: function_name.into(),
        }
    }

    /// Build a client from the ambient AWS credentials chain with an
    /// explicit region.
    pub async fn from_region(region: &str, function_name: impl Into<String>) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(aws_sdk_lambda::Client::new(&config), function_name)
    }
}

#[async_trait]
impl JobTransport for LambdaTransport {
    async fn submit(&self, submission: &JobSubmission) -> Result<TransportResponse, TransportError> {
        let payload = serde_json::to_vec(submission)?;

        let output = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| TransportError::Invoke(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(
            job_name = %submission.job_name,
            function = %self.function_name,
            status = output.status_code(),
            "Lambda invocation returned",
        );

        Ok(TransportResponse {
            status_code: output.status_code(),
            function_error: output.function_error().map(str::to_string),
            payload: output
                .payload()
                .map(|body| String::from_utf8_lossy(body.as_ref()).into_owned()),
        })
    }
}
