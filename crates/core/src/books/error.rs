//! Book error types.

use audiobooks_shared::AppError;
use audiobooks_shared::types::BookId;
use thiserror::Error;

use crate::objects::ObjectError;

/// Book operation errors.
#[derive(Debug, Error)]
pub enum BookError {
    /// Book not found.
    #[error("book not found: {0}")]
    NotFound(BookId),

    /// Required field missing or blank.
    #[error("{0}")]
    Validation(String),

    /// Upload form rejected before anything was stored.
    #[error("{0}")]
    InvalidUpload(String),

    /// Storing a cover or chapter failed.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl BookError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: BookId) -> Self {
        Self::NotFound(id)
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an upload error.
    #[must_use]
    pub fn invalid_upload(msg: impl Into<String>) -> Self {
        Self::InvalidUpload(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound(_) => Self::NotFound("Book not found".to_string()),
            BookError::Validation(msg) => Self::Validation(msg),
            BookError::InvalidUpload(msg) => Self::BadRequest(msg),
            BookError::Object(e) => e.into(),
            BookError::Repository(msg) => Self::Database(msg),
        }
    }
}
