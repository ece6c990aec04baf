//! Book types and data structures.

use audiobooks_shared::types::{BookId, ObjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a book's cover image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverRef {
    /// Stored object holding the image.
    pub file_id: ObjectId,
    /// Original filename.
    pub filename: String,
}

/// One playlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Stored object holding the audio.
    pub file_id: ObjectId,
    /// Original filename.
    pub filename: String,
    /// Chapter title.
    pub title: String,
    /// Sort key within the playlist.
    pub order: i32,
}

/// Audiobook record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier, serialized as `_id`.
    #[serde(rename = "_id")]
    pub id: BookId,
    /// Title.
    pub title: String,
    /// Author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Cover image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverRef>,
    /// Chapters, ascending by `order`.
    pub playlist: Vec<Chapter>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Book fields sent in the `metadata` part of an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookMetadata {
    /// Title (required by the time the book is created).
    #[serde(default)]
    pub title: Option<String>,
    /// Author.
    #[serde(default)]
    pub author: Option<String>,
    /// Summary.
    #[serde(default)]
    pub summary: Option<String>,
}

/// Request body for creating a book directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    /// Title; required and non-blank.
    #[serde(default)]
    pub title: Option<String>,
    /// Author.
    #[serde(default)]
    pub author: Option<String>,
    /// Summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Cover image reference.
    #[serde(default)]
    pub cover: Option<CoverRef>,
    /// Chapters.
    #[serde(default)]
    pub playlist: Vec<Chapter>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New author.
    #[serde(default)]
    pub author: Option<String>,
    /// New summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// New cover reference.
    #[serde(default)]
    pub cover: Option<CoverRef>,
    /// Replacement playlist.
    #[serde(default)]
    pub playlist: Option<Vec<Chapter>>,
}

impl BookPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.summary.is_none()
            && self.cover.is_none()
            && self.playlist.is_none()
    }

    /// Applies the patch to a book in place.
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = Some(author);
        }
        if let Some(summary) = self.summary {
            book.summary = Some(summary);
        }
        if let Some(cover) = self.cover {
            book.cover = Some(cover);
        }
        if let Some(mut playlist) = self.playlist {
            playlist.sort_by_key(|c| c.order);
            book.playlist = playlist;
        }
    }
}

/// Input for creating a book record.
#[derive(Debug, Clone)]
pub struct CreateBookInput {
    /// Book ID.
    pub id: BookId,
    /// Title.
    pub title: String,
    /// Author.
    pub author: Option<String>,
    /// Summary.
    pub summary: Option<String>,
    /// Cover image reference.
    pub cover: Option<CoverRef>,
    /// Chapters, already sorted.
    pub playlist: Vec<Chapter>,
}
