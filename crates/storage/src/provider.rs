//! Builds storage capabilities for a store identifier.
//!
//! Catalog entries and job submissions name their destination store by
//! identifier (`bucket_name`). The provider maps that identifier onto an
//! S3 bucket or onto a subdirectory of a local root.

use std::path::PathBuf;
use std::sync::Arc;

use aws_sdk_s3::config::Region;

use crate::catalog::{CatalogSource, YamlCatalogSource};
use crate::fs::FsObjectStore;
use crate::log::{JsonLogStorage, LogStorage};
use crate::s3::S3ObjectStore;

/// Which physical store backs catalog and log objects.
#[derive(Debug, Clone)]
pub enum StoreProvider {
    /// Each store identifier is an S3 bucket.
    S3(aws_sdk_s3::Client),
    /// Each store identifier is a directory under this root.
    Local(PathBuf),
}

impl StoreProvider {
    /// Build an S3 provider from the ambient AWS credentials chain with an
    /// explicit region.
    pub async fn s3(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::S3(aws_sdk_s3::Client::new(&config))
    }

    /// Build a filesystem provider rooted at `root`.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::Local(root.into())
    }

    /// Read-write log storage for `store`.
    pub fn log_storage(&self, store: &str) -> Arc<dyn LogStorage> {
        match self {
            Self::S3(client) => Arc::new(JsonLogStorage::new(S3ObjectStore::new(
                client.clone(),
                store,
            ))),
            Self::Local(root) => Arc::new(JsonLogStorage::new(FsObjectStore::new(root.join(store)))),
        }
    }

    /// Read-only catalog source for `store`.
    pub fn catalog_source(&self, store: &str) -> Arc<dyn CatalogSource> {
        match self {
            Self::S3(client) => Arc::new(YamlCatalogSource::new(S3ObjectStore::new(
                client.clone(),
                store,
            ))),
            Self::Local(root) => {
                Arc::new(YamlCatalogSource::new(FsObjectStore::new(root.join(store))))
            }
        }
    }
}
