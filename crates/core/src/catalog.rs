//! Catalog of monitored targets.
//!
//! The catalog is a YAML document with a top-level `sites` sequence. Each
//! record names the job, the page to fetch, the selector locating the
//! price node, and the store that receives the execution log. The two
//! monitoring fields (`alert_whenever`, `difference`) are carried for
//! downstream alerting and are only checked for presence here.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::naming::{is_valid_job_name, is_valid_store_name};

/// One monitored page/price configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Unique job identifier; also the history object stem.
    pub job_name: String,
    /// Page to fetch.
    pub site_url: String,
    /// Query locating the single node holding the price text.
    #[serde(rename = "html_query")]
    pub html_selector: String,
    /// Store (bucket or directory) receiving this job's execution log.
    #[serde(rename = "bucket_name")]
    pub destination_store: String,
    /// Alerting threshold, opaque to the pipeline.
    #[serde(rename = "alert_whenever", default)]
    pub alert_threshold: Option<serde_json::Value>,
    /// Unit of the price delta used by alerting, opaque to the pipeline.
    #[serde(rename = "difference", default)]
    pub price_delta_unit: Option<serde_json::Value>,
}

/// The full list of targets, loaded once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub sites: Vec<Target>,
}

impl Catalog {
    /// Parse and validate a catalog document.
    ///
    /// Malformed YAML, a missing `sites` key, or a record missing one of
    /// the string fields is a [`CoreError::Parse`]. Rule violations are a
    /// [`CoreError::Validation`].
    pub fn from_yaml(source: &str) -> Result<Self, CoreError> {
        let catalog: Catalog =
            serde_saphyr::from_str(source).map_err(|e| CoreError::Parse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check every catalog rule:
    ///
    /// - `job_name` is a usable object stem and unique across the catalog
    /// - `site_url` and `html_query` are non-empty
    /// - `bucket_name` is a bare store name (no separators, no `..`)
    /// - `alert_whenever` and `difference` are present
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();

        for (index, target) in self.sites.iter().enumerate() {
            let label = || format!("site #{index} ('{}')", target.job_name);

            if !is_valid_job_name(&target.job_name) {
                return Err(CoreError::Validation(format!(
                    "{}: job_name must be non-empty, must not contain path separators, \
                     and must not be reserved",
                    label()
                )));
            }
            if !seen.insert(target.job_name.as_str()) {
                return Err(CoreError::Validation(format!(
                    "{}: duplicate job_name",
                    label()
                )));
            }
            require_non_empty(&target.site_url, "site_url", &label)?;
            require_non_empty(&target.html_selector, "html_query", &label)?;
            require_non_empty(&target.destination_store, "bucket_name", &label)?;
            if !is_valid_store_name(&target.destination_store) {
                return Err(CoreError::Validation(format!(
                    "{}: bucket_name '{}' must be a bare store name without path components",
                    label(),
                    target.destination_store
                )));
            }
            if target.alert_threshold.is_none() {
                return Err(CoreError::Validation(format!(
                    "{}: missing alert_whenever",
                    label()
                )));
            }
            if target.price_delta_unit.is_none() {
                return Err(CoreError::Validation(format!(
                    "{}: missing difference",
                    label()
                )));
            }
        }

        Ok(())
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the catalog lists no targets.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Iterate targets in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.sites.iter()
    }
}

fn require_non_empty(
    value: &str,
    field: &str,
    label: &dyn Fn() -> String,
) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "{}: {field} must be non-empty",
            label()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
