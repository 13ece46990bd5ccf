//! Two-level execution log.
//!
//! Every recorded extraction is appended to the job's own history object
//! (`<job_name>.json`) and then upserted into the shared latest-state
//! object (`job-last-executed.json`). Both writes are full
//! read-modify-write cycles through [`LogStorage`].
//!
//! The two steps are not atomic: if the latest-state update fails after
//! the history append succeeded, the history keeps the new entry and the
//! index keeps its previous value.
//!
//! The latest-state index is shared by every job writing to the same
//! store, including jobs running in other processes. Its update is a
//! versioned read followed by a conditional write; a write that lost a
//! race is re-read and retried. Clones of one [`ExecutionLog`] also share
//! a lock so writers in the same process do not race each other at all.
//! History objects are disjoint per job and are not locked.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pricewatch_core::log_entry::{format_timestamp, HistoryEntry, LatestStateEntry};
use pricewatch_core::naming::{history_object_name, LATEST_STATE_OBJECT};
use pricewatch_storage::{LogStorage, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::LogError;

/// Conditional latest-state writes attempted before giving up.
const MAX_LATEST_STATE_ATTEMPTS: u32 = 100;

/// Behaviour switches for the execution log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// When `false`, [`ExecutionLog::record`] is a no-op.
    pub enabled: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Per-job history plus latest-state index over one store.
#[derive(Clone)]
pub struct ExecutionLog {
    storage: Arc<dyn LogStorage>,
    settings: LogSettings,
    latest_state_lock: Arc<Mutex<()>>,
}

impl ExecutionLog {
    pub fn new(storage: Arc<dyn LogStorage>, settings: LogSettings) -> Self {
        Self {
            storage,
            settings,
            latest_state_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Record a successful extraction of `price` for `job_name` now.
    pub async fn record(&self, job_name: &str, price: &str) -> Result<(), LogError> {
        self.record_at(job_name, price, Utc::now()).await
    }

    /// Record a successful extraction at `at`.
    ///
    /// One timestamp is used for both the history entry and the
    /// latest-state entry.
    pub async fn record_at(
        &self,
        job_name: &str,
        price: &str,
        at: DateTime<Utc>,
    ) -> Result<(), LogError> {
        if !self.settings.enabled {
            tracing::debug!(job_name, "Execution log disabled, skipping record");
            return Ok(());
        }

        let executed_at = format_timestamp(at);
        self.append_history(job_name, price, &executed_at).await?;
        self.update_latest_state(job_name, price, &executed_at)
            .await?;

        tracing::info!(job_name, price, executed_at = %executed_at, "Execution recorded");
        Ok(())
    }

    /// Full history of `job_name`, oldest first. Empty if it never ran.
    pub async fn history(&self, job_name: &str) -> Result<Vec<HistoryEntry>, LogError> {
        let name = history_object_name(job_name);
        let raw = self.storage.load(&name).await?;
        decode_entries(&name, raw)
    }

    /// The latest-state index, in first-recorded order.
    pub async fn latest_state(&self) -> Result<Vec<LatestStateEntry>, LogError> {
        let raw = self.storage.load(LATEST_STATE_OBJECT).await?;
        decode_entries(LATEST_STATE_OBJECT, raw)
    }

    /// Latest entry of one job, if it ever ran.
    pub async fn latest_for(&self, job_name: &str) -> Result<Option<LatestStateEntry>, LogError> {
        Ok(self
            .latest_state()
            .await?
            .into_iter()
            .find(|entry| entry.job_name == job_name))
    }

    async fn append_history(
        &self,
        job_name: &str,
        price: &str,
        executed_at: &str,
    ) -> Result<(), LogError> {
        let name = history_object_name(job_name);
        let mut entries: Vec<HistoryEntry> = decode_entries(&name, self.storage.load(&name).await?)?;

        entries.push(HistoryEntry {
            executed_at: executed_at.to_string(),
            price: price.to_string(),
        });

        self.storage
            .save(&name, &encode_entries(&name, &entries)?)
            .await?;
        tracing::debug!(job_name, entries = entries.len(), "History appended");
        Ok(())
    }

    async fn update_latest_state(
        &self,
        job_name: &str,
        price: &str,
        executed_at: &str,
    ) -> Result<(), LogError> {
        let _guard = self.latest_state_lock.lock().await;

        for attempt in 1..=MAX_LATEST_STATE_ATTEMPTS {
            let current = self.storage.load_versioned(LATEST_STATE_OBJECT).await?;
            let mut entries: Vec<LatestStateEntry> =
                decode_entries(LATEST_STATE_OBJECT, current.entries)?;
            upsert_latest(&mut entries, job_name, price, executed_at);

            let encoded = encode_entries(LATEST_STATE_OBJECT, &entries)?;
            match self
                .storage
                .save_if(LATEST_STATE_OBJECT, &encoded, current.version.as_ref())
                .await
            {
                Ok(()) => return Ok(()),
                Err(StorageError::Conflict { .. }) => {
                    tracing::debug!(
                        job_name,
                        attempt,
                        "Latest state changed concurrently, retrying"
                    );
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LogError::Contention {
            name: LATEST_STATE_OBJECT.to_string(),
            attempts: MAX_LATEST_STATE_ATTEMPTS,
        })
    }
}

/// Back-off before the next conditional write, growing to 50ms.
fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(u64::from(attempt.min(25)) * 2)
}

/// Update the entry for `job_name` in place, or append one if absent.
fn upsert_latest(
    entries: &mut Vec<LatestStateEntry>,
    job_name: &str,
    price: &str,
    executed_at: &str,
) {
    match entries.iter_mut().find(|entry| entry.job_name == job_name) {
        Some(entry) => {
            entry.executed_at = executed_at.to_string();
            entry.price = price.to_string();
        }
        None => entries.push(LatestStateEntry {
            job_name: job_name.to_string(),
            executed_at: executed_at.to_string(),
            price: price.to_string(),
        }),
    }
}

fn decode_entries<T: DeserializeOwned>(name: &str, raw: Vec<Value>) -> Result<Vec<T>, LogError> {
    raw.into_iter()
        .map(|value| {
            serde_json::from_value(value).map_err(|source| LogError::Malformed {
                name: name.to_string(),
                source,
            })
        })
        .collect()
}

fn encode_entries<T: Serialize>(name: &str, entries: &[T]) -> Result<Vec<Value>, LogError> {
    entries
        .iter()
        .map(|entry| {
            serde_json::to_value(entry).map_err(|source| LogError::Malformed {
                name: name.to_string(),
                source,
            })
        })
        .collect()
}
