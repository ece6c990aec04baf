//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed client input (ids, JSON bodies, multipart forms).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Required field missing or invalid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Requested byte range cannot be served for an object of this length.
    #[error("Range not satisfiable for object of {length} bytes")]
    RangeNotSatisfiable {
        /// Total length of the object.
        length: u64,
    },

    /// Object storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::RangeNotSatisfiable { .. } => 416,
            Self::Storage(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for logs and API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RangeNotSatisfiable { .. } => "RANGE_NOT_SATISFIABLE",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to clients.
    ///
    /// Client errors carry their own message; server-side failures are
    /// reported generically so driver details stay in the logs.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::BadRequest(msg) | Self::Validation(msg) | Self::NotFound(msg) => msg.clone(),
            Self::RangeNotSatisfiable { .. } => self.to_string(),
            Self::Storage(_) => "Storage operation failed".to_string(),
            Self::Database(_) => "Database operation failed".to_string(),
            Self::Internal(_) => "An error occurred".to_string(),
        }
    }

    /// Whether the error originates on the server side.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
