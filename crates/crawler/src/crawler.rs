//! One crawl job: extract, then record.

use crate::error::CrawlError;
use crate::execution_log::ExecutionLog;
use crate::extract::Extractor;

/// Gets a page, extracts its price, and logs the execution.
#[derive(Clone)]
pub struct Crawler {
    extractor: Extractor,
    log: ExecutionLog,
}

impl Crawler {
    pub fn new(extractor: Extractor, log: ExecutionLog) -> Self {
        Self { extractor, log }
    }

    /// Extract the price of `url` and record it under `job_name`.
    ///
    /// Nothing is recorded when extraction fails.
    pub async fn grab_price(
        &self,
        job_name: &str,
        url: &str,
        selector: &str,
    ) -> Result<String, CrawlError> {
        let price = match self.extractor.extract(url, selector).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(job_name, url, error = %e, "Price extraction failed");
                return Err(e.into());
            }
        };

        self.log.record(job_name, &price).await?;
        Ok(price)
    }
}
