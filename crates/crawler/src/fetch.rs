//! Page fetching.
//!
//! [`PageFetcher`] is the only network seam of the extractor; production
//! code uses [`HttpFetcher`], tests substitute static pages.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExtractError;

/// Fetches the raw bytes of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`. Not retried; the caller decides what a failure means.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExtractError>;
}

/// HTTP(S) fetcher backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pricewatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> ExtractError {
        if err.is_timeout() {
            ExtractError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ExtractError::Fetch {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExtractError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Fetch {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(url, e))?;
        tracing::debug!(url, bytes = body.len(), "Page fetched");
        Ok(body.to_vec())
    }
}
