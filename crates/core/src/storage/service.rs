//! Storage service implementation using Apache OpenDAL.

use std::io;
use std::ops::Range;
use std::pin::Pin;

use audiobooks_shared::types::ObjectId;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use opendal::{Operator, services};

use super::error::StorageError;
use super::{StorageProvider, StorageSettings};

/// Byte stream over a stored blob, owned by exactly one consumer.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Storage service for stored object bytes.
pub struct StorageService {
    operator: Operator,
    settings: StorageSettings,
}

impl StorageService {
    /// Create a new storage service from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_settings(settings: StorageSettings) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&settings.provider)?;
        Ok(Self { operator, settings })
    }

    /// In-process storage, lost when dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be initialized.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_settings(StorageSettings {
            provider: StorageProvider::Memory,
            ..StorageSettings::default()
        })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish()
                .pipe(Ok),
        }
    }

    /// Storage key for an object.
    ///
    /// Format: `{key_prefix}/{object_id}`
    #[must_use]
    pub fn object_key(&self, id: &ObjectId) -> String {
        let prefix = self.settings.key_prefix.trim_matches('/');
        if prefix.is_empty() {
            id.to_string()
        } else {
            format!("{prefix}/{id}")
        }
    }

    /// Write a blob in one piece, returning its length.
    ///
    /// Content types are kept with the object metadata, not on the blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    pub async fn write(&self, key: &str, data: Bytes) -> Result<u64, StorageError> {
        let length = data.len() as u64;

        self.operator
            .write(key, data)
            .await
            .map_err(StorageError::from)?;

        tracing::debug!(key, length, provider = self.provider_name(), "Blob written");
        Ok(length)
    }

    /// Open a stream over `range` (half-open) of a blob.
    ///
    /// The blob is checked to exist and to cover `range` before the stream is
    /// returned. Bytes are then pulled from the backend as the stream is
    /// polled; dropping the stream releases the backend reader.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the blob is missing, or an operation error if it
    /// is shorter than `range.end` or cannot be opened.
    pub async fn reader(&self, key: &str, range: Range<u64>) -> Result<ByteStream, StorageError> {
        if range.is_empty() {
            return Ok(futures::stream::empty::<io::Result<Bytes>>().boxed());
        }

        let length = self.blob_length(key).await?;
        if range.end > length {
            return Err(StorageError::operation(format!(
                "blob {key} holds {length} bytes, {} requested",
                range.end
            )));
        }

        let stream = self
            .operator
            .reader(key)
            .await
            .map_err(StorageError::from)?
            .into_bytes_stream(range)
            .await
            .map_err(StorageError::from)?;

        Ok(stream.boxed())
    }

    /// Size of a blob as reported by the backend.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the blob does not exist, or an operation error if
    /// the backend cannot be reached.
    pub async fn blob_length(&self, key: &str) -> Result<u64, StorageError> {
        let meta = self.operator.stat(key).await.map_err(StorageError::from)?;
        Ok(meta.content_length())
    }

    /// Delete a blob from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.settings.provider.name()
    }
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}
