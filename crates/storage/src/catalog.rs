//! Read-only catalog loading.

use async_trait::async_trait;
use pricewatch_core::catalog::Catalog;

use crate::error::StorageError;
use crate::fs::FsObjectStore;
use crate::object::ObjectStore;
use crate::s3::S3ObjectStore;

/// Source of catalog documents. There is deliberately no write path.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load, parse and validate the named catalog.
    ///
    /// A missing catalog is [`StorageError::NotFound`]; a malformed or
    /// invalid one is [`StorageError::Catalog`].
    async fn load_catalog(&self, name: &str) -> Result<Catalog, StorageError>;
}

/// [`CatalogSource`] reading YAML from any [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct YamlCatalogSource<S> {
    store: S,
}

/// Catalog kept in an S3 bucket.
pub type S3CatalogSource = YamlCatalogSource<S3ObjectStore>;

/// Catalog kept in a local directory.
pub type FsCatalogSource = YamlCatalogSource<FsObjectStore>;

impl<S: ObjectStore> YamlCatalogSource<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ObjectStore> CatalogSource for YamlCatalogSource<S> {
    async fn load_catalog(&self, name: &str) -> Result<Catalog, StorageError> {
        let bytes = self
            .store
            .get(name)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                name: name.to_string(),
            })?;

        let text = String::from_utf8(bytes)
            .map_err(|e| StorageError::malformed(name, format!("not UTF-8: {e}")))?;

        let catalog = Catalog::from_yaml(&text).map_err(|source| StorageError::Catalog {
            name: name.to_string(),
            source,
        })?;

        tracing::info!(
            location = %self.store.location(),
            name,
            sites = catalog.len(),
            "Catalog loaded",
        );
        Ok(catalog)
    }
}
