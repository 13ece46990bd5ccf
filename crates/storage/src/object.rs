//! Raw named-object access shared by the log and catalog capabilities.

use async_trait::async_trait;

use crate::error::StorageError;

/// Opaque version of a stored object (an S3 ETag, a content digest).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectVersion(pub String);

/// Byte-level access to named objects in one bucket or directory.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object. `Ok(None)` means the object does not exist.
    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Read an object together with its current version.
    async fn get_versioned(
        &self,
        name: &str,
    ) -> Result<Option<(Vec<u8>, ObjectVersion)>, StorageError>;

    /// Replace an object's contents entirely.
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Replace an object only if it is still at `expected`.
    ///
    /// `None` means the object must not exist yet. A lost race is
    /// [`StorageError::Conflict`]; the caller re-reads and retries.
    async fn put_if(
        &self,
        name: &str,
        bytes: Vec<u8>,
        expected: Option<&ObjectVersion>,
    ) -> Result<(), StorageError>;

    /// Whether the object exists.
    async fn exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Human-readable location used in log messages (`s3://bucket`, a path).
    fn location(&self) -> String;
}
