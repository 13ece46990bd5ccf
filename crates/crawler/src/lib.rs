//! `pricewatch-crawler` library crate.
//!
//! The crawl side of a job: fetch a page, extract its single price, and
//! record the result in the execution log. The `pricewatch-grabber`
//! binary wraps [`service::CrawlService`] for one event.

pub mod config;
pub mod crawler;
pub mod error;
pub mod execution_log;
pub mod extract;
pub mod fetch;
pub mod service;

pub use crawler::Crawler;
pub use error::{CrawlError, ExtractError, LogError};
pub use execution_log::{ExecutionLog, LogSettings};
pub use extract::Extractor;
pub use fetch::{HttpFetcher, PageFetcher};
pub use service::{CrawlOutcome, CrawlService};
