//! Entry shapes of the two execution-log documents.
//!
//! History objects are JSON arrays of [`HistoryEntry`]; the shared
//! latest-state object is a JSON array of [`LatestStateEntry`]. Both use
//! `executed` as the timestamp key on the wire.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One past extraction in a job's append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "executed")]
    pub executed_at: String,
    /// Extracted price, verbatim.
    pub price: String,
}

/// Most recent extraction of one job in the shared index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestStateEntry {
    pub job_name: String,
    #[serde(rename = "executed")]
    pub executed_at: String,
    /// Extracted price, verbatim.
    pub price: String,
}

/// Render a UTC instant as the ISO-8601 string stored in log documents.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
