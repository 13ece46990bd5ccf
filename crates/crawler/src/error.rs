//! Error types for extraction, logging and whole crawl jobs.

use pricewatch_storage::StorageError;

/// Failures while fetching a page or pulling the price out of it.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The page could not be fetched (network, DNS, TLS, non-2xx status).
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// The fetch exceeded its time budget.
    #[error("Fetching {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The selector is invalid or did not match exactly one node.
    #[error("Selector '{selector}' {message}")]
    Selector { selector: String, message: String },

    /// The node text did not contain exactly one price.
    #[error("Couldn't parse the price from '{text}': {message}")]
    Extraction { text: String, message: String },
}

/// Failures while reading or writing the execution log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The shared document kept changing under every update attempt.
    #[error("Gave up updating '{name}' after {attempts} conflicting writes")]
    Contention { name: String, attempts: u32 },

    /// A stored entry does not have the expected log entry shape.
    #[error("Malformed entry in '{name}': {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of one crawl job end to end.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// The job description is missing a key or carries an unusable value.
    #[error("Invalid crawl event: {0}")]
    InvalidEvent(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Log(#[from] LogError),
}
