//! Invoke event handling.
//!
//! An invoke event names the store holding the catalog:
//! `{"bucket_name": ".."}`. The handler loads the catalog from that store,
//! runs the [`Orchestrator`], and returns the JSON report
//! `[{"job_name": .., "status": ..}, ...]`.

use std::sync::Arc;

use pricewatch_core::job::JobReport;
use pricewatch_core::naming::is_valid_store_name;
use pricewatch_storage::StoreProvider;
use serde_json::Value;

use crate::orchestrator::{DispatchSettings, Orchestrator, RunError};
use crate::transport::JobTransport;

/// Resolves catalog stores and runs one orchestrated pass per event.
pub struct InvokeHandler {
    provider: StoreProvider,
    transport: Arc<dyn JobTransport>,
    settings: DispatchSettings,
}

impl InvokeHandler {
    pub fn new(
        provider: StoreProvider,
        transport: Arc<dyn JobTransport>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            provider,
            transport,
            settings,
        }
    }

    /// Run the catalog named by `event` and return the encoded report.
    pub async fn handle_invoke_event(&self, event: &Value) -> Result<String, RunError> {
        let reports = self.run_event(event).await?;
        Ok(serde_json::to_string(&reports)?)
    }

    /// Run the catalog named by `event` and return one report per site.
    pub async fn run_event(&self, event: &Value) -> Result<Vec<JobReport>, RunError> {
        let bucket = catalog_store(event)?;
        tracing::info!(bucket = %bucket, "Invoke event received");

        let orchestrator = Orchestrator::new(
            self.provider.catalog_source(bucket),
            Arc::clone(&self.transport),
            self.settings.clone(),
        );
        orchestrator.run().await
    }
}

/// The catalog store named by an invoke event.
pub fn catalog_store(event: &Value) -> Result<&str, RunError> {
    let object = event
        .as_object()
        .ok_or_else(|| RunError::InvalidEvent("event must be a JSON object".into()))?;

    match object.get("bucket_name") {
        Some(Value::String(bucket)) if is_valid_store_name(bucket) => Ok(bucket),
        Some(Value::String(bucket)) if !bucket.trim().is_empty() => Err(RunError::InvalidEvent(
            format!("'bucket_name' '{bucket}' must be a bare store name without path components"),
        )),
        Some(_) => Err(RunError::InvalidEvent(
            "'bucket_name' must be a non-empty string".into(),
        )),
        None => Err(RunError::InvalidEvent(
            "The 'bucket_name' key is missing from the event".into(),
        )),
    }
}
