use pricewatch_core::error::CoreError;

/// Errors from loading or saving stored objects.
///
/// An absent log object is not an error; see [`crate::LogStorage::load`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Local filesystem I/O failed.
    #[error("I/O error on '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The remote object store rejected or failed the request.
    #[error("Object store error on '{name}': {message}")]
    Backend { name: String, message: String },

    /// The object exists but its contents are not the expected document shape.
    #[error("Malformed document '{name}': {message}")]
    Malformed { name: String, message: String },

    /// A conditional write lost against a concurrent writer.
    #[error("Object '{name}' was modified concurrently")]
    Conflict { name: String },

    /// A required read-only object (the catalog) does not exist.
    #[error("Object '{name}' not found")]
    NotFound { name: String },

    /// The catalog parsed into an invalid shape.
    #[error("Invalid catalog '{name}': {source}")]
    Catalog {
        name: String,
        #[source]
        source: CoreError,
    },
}

impl StorageError {
    pub(crate) fn io(name: &str, source: std::io::Error) -> Self {
        Self::Io {
            name: name.to_string(),
            source,
        }
    }

    pub(crate) fn backend(name: &str, message: impl Into<String>) -> Self {
        Self::Backend {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn conflict(name: &str) -> Self {
        Self::Conflict {
            name: name.to_string(),
        }
    }

    pub(crate) fn malformed(name: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
