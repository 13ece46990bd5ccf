//! Read-write JSON array documents used by the execution log.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;
use crate::fs::FsObjectStore;
use crate::object::{ObjectStore, ObjectVersion};
use crate::s3::S3ObjectStore;

/// Load/save/exists over named JSON array documents.
///
/// `save` replaces the whole document; merging is the caller's job.
/// Documents shared by several writers go through `load_versioned` and
/// `save_if` so a lost race is detected instead of overwritten.
#[async_trait]
pub trait LogStorage: Send + Sync {
    /// Load a document. An absent object is an empty sequence.
    async fn load(&self, name: &str) -> Result<Vec<Value>, StorageError>;

    /// Overwrite a document with `entries`.
    async fn save(&self, name: &str, entries: &[Value]) -> Result<(), StorageError>;

    /// Load a document with the version it was read at.
    async fn load_versioned(&self, name: &str) -> Result<VersionedEntries, StorageError>;

    /// Overwrite a document only if it is still at `expected` (`None`:
    /// still absent). A lost race is [`StorageError::Conflict`].
    async fn save_if(
        &self,
        name: &str,
        entries: &[Value],
        expected: Option<&ObjectVersion>,
    ) -> Result<(), StorageError>;

    /// Whether the named document exists.
    async fn exists(&self, name: &str) -> Result<bool, StorageError>;
}

/// A document's entries and the version they were read at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionedEntries {
    pub entries: Vec<Value>,
    /// `None` when the document does not exist yet.
    pub version: Option<ObjectVersion>,
}

/// [`LogStorage`] over any [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct JsonLogStorage<S> {
    store: S,
}

/// Execution logs kept in an S3 bucket.
pub type S3LogStorage = JsonLogStorage<S3ObjectStore>;

/// Execution logs kept in a local directory.
pub type FsLogStorage = JsonLogStorage<FsObjectStore>;

impl<S: ObjectStore> JsonLogStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ObjectStore> LogStorage for JsonLogStorage<S> {
    async fn load(&self, name: &str) -> Result<Vec<Value>, StorageError> {
        match self.store.get(name).await? {
            Some(bytes) => decode_document(name, &bytes),
            None => {
                tracing::debug!(location = %self.store.location(), name, "No log object yet");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, name: &str, entries: &[Value]) -> Result<(), StorageError> {
        self.store.put(name, encode_document(name, entries)?).await
    }

    async fn load_versioned(&self, name: &str) -> Result<VersionedEntries, StorageError> {
        match self.store.get_versioned(name).await? {
            Some((bytes, version)) => Ok(VersionedEntries {
                entries: decode_document(name, &bytes)?,
                version: Some(version),
            }),
            None => Ok(VersionedEntries::default()),
        }
    }

    async fn save_if(
        &self,
        name: &str,
        entries: &[Value],
        expected: Option<&ObjectVersion>,
    ) -> Result<(), StorageError> {
        self.store
            .put_if(name, encode_document(name, entries)?, expected)
            .await
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        self.store.exists(name).await
    }
}

fn decode_document(name: &str, bytes: &[u8]) -> Result<Vec<Value>, StorageError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(entries)) => Ok(entries),
        Ok(other) => Err(StorageError::malformed(
            name,
            format!("expected a JSON array, found {}", json_kind(&other)),
        )),
        Err(e) => Err(StorageError::malformed(name, e.to_string())),
    }
}

fn encode_document(name: &str, entries: &[Value]) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(entries).map_err(|e| StorageError::malformed(name, e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
