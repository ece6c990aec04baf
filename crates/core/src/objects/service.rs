//! Stored object service implementation.

use std::sync::Arc;

use audiobooks_shared::types::ObjectId;

use super::error::ObjectError;
use super::types::{NewObject, ObjectKind, StoredObject, UploadedFile};
use crate::range::ByteRange;
use crate::storage::{ByteStream, StorageService};

/// Repository trait for stored object metadata.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait ObjectRepository: Send + Sync {
    /// Create a metadata record.
    fn create(
        &self,
        input: NewObject,
    ) -> impl std::future::Future<Output = Result<StoredObject, ObjectError>> + Send;

    /// Find metadata by ID.
    fn find_by_id(
        &self,
        id: ObjectId,
    ) -> impl std::future::Future<Output = Result<Option<StoredObject>, ObjectError>> + Send;
}

/// Stored object service: writes, looks up and opens objects.
pub struct ObjectService<R: ObjectRepository> {
    storage: Arc<StorageService>,
    repo: Arc<R>,
}

impl<R: ObjectRepository> ObjectService<R> {
    /// Create a new object service.
    #[must_use]
    pub fn new(storage: Arc<StorageService>, repo: Arc<R>) -> Self {
        Self { storage, repo }
    }

    /// Store an uploaded file as a new object.
    ///
    /// The blob is written before the metadata record; if the record cannot
    /// be created the blob is removed again, so a failed store leaves nothing
    /// visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob write or the metadata insert fails.
    pub async fn store(
        &self,
        file: UploadedFile,
        kind: ObjectKind,
        chapter: Option<i32>,
    ) -> Result<StoredObject, ObjectError> {
        let id = ObjectId::new();
        let key = self.storage.object_key(&id);
        let content_type = file.content_type_or_default().to_string();

        let length = self.storage.write(&key, file.data).await?;

        let input = NewObject {
            id,
            filename: file.filename,
            content_type,
            length,
            kind,
            chapter,
        };

        match self.repo.create(input).await {
            Ok(object) => {
                tracing::info!(
                    object_id = %object.id,
                    kind = object.kind.as_str(),
                    length = object.length,
                    "Stored object"
                );
                Ok(object)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&key).await {
                    tracing::warn!(key, error = %cleanup, "Failed to remove orphaned blob");
                }
                Err(e)
            }
        }
    }

    /// Metadata for an object.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record exists, or a repository error.
    pub async fn metadata(&self, id: ObjectId) -> Result<StoredObject, ObjectError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ObjectError::not_found(id))
    }

    /// Open a byte stream over `window`, or over the whole object.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be opened.
    pub async fn open(
        &self,
        object: &StoredObject,
        window: Option<ByteRange>,
    ) -> Result<ByteStream, ObjectError> {
        let key = self.storage.object_key(&object.id);
        let range = window.map_or(0..object.length, |w| w.as_std());

        Ok(self.storage.reader(&key, range).await?)
    }
}
