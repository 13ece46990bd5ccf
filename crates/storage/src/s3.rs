//! Amazon S3 object store keyed by bucket.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::StorageError;
use crate::object::{ObjectStore, ObjectVersion};

/// Statuses S3 returns when a conditional write loses a race.
const PRECONDITION_STATUSES: [u16; 2] = [409, 412];

/// Objects stored as keys in a single S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Wrap an existing client; clients are cheap to clone and share a
    /// connection pool.
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.get_versioned(name).await?.map(|(bytes, _)| bytes))
    }

    async fn get_versioned(
        &self,
        name: &str,
    ) -> Result<Option<(Vec<u8>, ObjectVersion)>, StorageError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|service| service.is_no_such_key())
                {
                    return Ok(None);
                }
                return Err(StorageError::backend(
                    name,
                    DisplayErrorContext(&err).to_string(),
                ));
            }
        };

        let version = output
            .e_tag()
            .map(|etag| ObjectVersion(etag.to_string()))
            .ok_or_else(|| StorageError::backend(name, "response carries no ETag"))?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::backend(name, e.to_string()))?
            .into_bytes();
        Ok(Some((bytes.to_vec(), version)))
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .content_type(content_type_for(name))
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| StorageError::backend(name, DisplayErrorContext(&err).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = name, "Object written");
        Ok(())
    }

    async fn put_if(
        &self,
        name: &str,
        bytes: Vec<u8>,
        expected: Option<&ObjectVersion>,
    ) -> Result<(), StorageError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .content_type(content_type_for(name))
            .body(ByteStream::from(bytes));
        let request = match expected {
            Some(version) => request.if_match(version.0.clone()),
            None => request.if_none_match("*"),
        };

        match request.send().await {
            Ok(_) => {
                tracing::debug!(bucket = %self.bucket, key = name, "Object conditionally written");
                Ok(())
            }
            Err(err) => {
                let status = err.raw_response().map(|raw| raw.status().as_u16());
                if status.is_some_and(|code| PRECONDITION_STATUSES.contains(&code)) {
                    Err(StorageError::conflict(name))
                } else {
                    Err(StorageError::backend(
                        name,
                        DisplayErrorContext(&err).to_string(),
                    ))
                }
            }
        }
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|service| service.is_not_found())
                {
                    Ok(false)
                } else {
                    Err(StorageError::backend(
                        name,
                        DisplayErrorContext(&err).to_string(),
                    ))
                }
            }
        }
    }

    fn location(&self) -> String {
        format!("s3://{}", self.bucket)
    }
}

/// Content type recorded on uploaded objects.
fn content_type_for(name: &str) -> &'static str {
    if name.ends_with(".json") {
        "application/json"
    } else if name.ends_with(".yml") || name.ends_with(".yaml") {
        "application/yaml"
    } else {
        "application/octet-stream"
    }
}
