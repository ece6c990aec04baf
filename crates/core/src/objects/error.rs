//! Stored object error types.

use audiobooks_shared::AppError;
use audiobooks_shared::types::ObjectId;
use thiserror::Error;

use crate::storage::StorageError;

/// Stored object operation errors.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// No metadata record for this id.
    #[error("file not found: {0}")]
    NotFound(ObjectId),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ObjectError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: ObjectId) -> Self {
        Self::NotFound(id)
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<ObjectError> for AppError {
    fn from(err: ObjectError) -> Self {
        match err {
            ObjectError::NotFound(_) => Self::NotFound("File not found".to_string()),
            ObjectError::Storage(e) => e.into(),
            ObjectError::Repository(msg) => Self::Database(msg),
        }
    }
}
