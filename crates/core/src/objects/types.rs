//! Stored object types.

use audiobooks_shared::types::ObjectId;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type recorded when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// What a stored object was uploaded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Book cover image.
    Cover,
    /// Chapter audio.
    Audio,
    /// File from the generic upload endpoint.
    File,
}

impl ObjectKind {
    /// Convert to database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Audio => "audio",
            Self::File => "file",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cover" => Some(Self::Cover),
            "audio" => Some(Self::Audio),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

/// A file received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the client.
    pub filename: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl UploadedFile {
    /// Creates an uploaded file.
    #[must_use]
    pub fn new(filename: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data,
        }
    }

    /// Declared content type, or [`DEFAULT_CONTENT_TYPE`].
    #[must_use]
    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Input for creating a stored object metadata record.
#[derive(Debug, Clone)]
pub struct NewObject {
    /// Object ID, also the suffix of its storage key.
    pub id: ObjectId,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub length: u64,
    /// Upload kind.
    pub kind: ObjectKind,
    /// 1-based chapter number for chapter audio.
    pub chapter: Option<i32>,
}

/// Stored object metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub length: u64,
    /// Upload kind.
    pub kind: ObjectKind,
    /// 1-based chapter number for chapter audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<i32>,
    /// When the object was stored.
    pub created_at: DateTime<Utc>,
}
