//! Filesystem object store rooted at a directory.
//!
//! Every write goes to a uniquely named temp file in the root and is then
//! renamed over the target, so readers never see a partial document and
//! concurrent writers never share a temp path. Conditional writes hold a
//! `<name>.lock` file created exclusively, which also serialises writers
//! in other processes sharing the directory.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tokio::fs;

use crate::error::StorageError;
use crate::object::{ObjectStore, ObjectVersion};

/// Suffix of the lock file guarding conditional writes.
const LOCK_SUFFIX: &str = ".lock";

/// A lock file older than this is assumed left behind by a crashed writer.
const STALE_LOCK_AFTER: Duration = Duration::from_secs(30);

/// Objects stored as files directly under `root`.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn write_atomic(&self, name: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::io(name, e))?;

        let root = self.root.clone();
        let path = self.path_of(name);
        let written = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
            let mut temp = NamedTempFile::new_in(&root)?;
            temp.write_all(&bytes)?;
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|e| e.error)?;
            Ok(path)
        })
        .await
        .map_err(|e| StorageError::backend(name, e.to_string()))?;

        let path = written.map_err(|e| StorageError::io(name, e))?;
        tracing::debug!(path = %path.display(), "Object written");
        Ok(())
    }
}

/// Content digest used as the version of a file.
fn version_of(bytes: &[u8]) -> ObjectVersion {
    ObjectVersion(format!("{:x}", Sha256::digest(bytes)))
}

/// Exclusive lock file, removed on drop.
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Create the lock file, or `None` when another writer holds it.
    async fn try_acquire(path: PathBuf) -> std::io::Result<Option<Self>> {
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(_) => Ok(Some(Self { path })),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if is_stale(&path).await {
                    tracing::warn!(path = %path.display(), "Removing stale lock file");
                    let _ = fs::remove_file(&path).await;
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .ok()
        .and_then(|meta| meta.modified().ok())
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > STALE_LOCK_AFTER)
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_of(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(name, e)),
        }
    }

    async fn get_versioned(
        &self,
        name: &str,
    ) -> Result<Option<(Vec<u8>, ObjectVersion)>, StorageError> {
        Ok(self.get(name).await?.map(|bytes| {
            let version = version_of(&bytes);
            (bytes, version)
        }))
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.write_atomic(name, bytes).await
    }

    async fn put_if(
        &self,
        name: &str,
        bytes: Vec<u8>,
        expected: Option<&ObjectVersion>,
    ) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::io(name, e))?;

        let lock_path = self.path_of(&format!("{name}{LOCK_SUFFIX}"));
        let Some(_lock) = LockFile::try_acquire(lock_path)
            .await
            .map_err(|e| StorageError::io(name, e))?
        else {
            return Err(StorageError::conflict(name));
        };

        let current = self.get(name).await?.map(|bytes| version_of(&bytes));
        if current.as_ref() != expected {
            return Err(StorageError::conflict(name));
        }

        self.write_atomic(name, bytes).await
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        match fs::metadata(self.path_of(name)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(name, e)),
        }
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
