//! Storage capabilities for the price-watch pipeline.
//!
//! Two capability traits sit on top of a raw [`ObjectStore`]:
//!
//! - [`LogStorage`]: read-write JSON array documents (execution logs).
//!   Loading an absent object yields an empty sequence.
//! - [`CatalogSource`]: read-only YAML catalog documents.
//!
//! Each has an S3 realization keyed by bucket and a filesystem
//! realization keyed by directory; [`StoreProvider`] builds either for a
//! given store identifier.

pub mod catalog;
pub mod error;
pub mod fs;
pub mod log;
pub mod object;
pub mod provider;
pub mod s3;

pub use catalog::{CatalogSource, FsCatalogSource, S3CatalogSource, YamlCatalogSource};
pub use error::StorageError;
pub use fs::FsObjectStore;
pub use log::{FsLogStorage, JsonLogStorage, LogStorage, S3LogStorage, VersionedEntries};
pub use object::{ObjectStore, ObjectVersion};
pub use provider::StoreProvider;
pub use s3::S3ObjectStore;
