//! Audiobook catalogue.
//!
//! Books reference stored objects: one cover image and an ordered playlist
//! of chapter audio. The integrated upload decodes a multipart form into a
//! [`BookUpload`], validates it before anything is written, stores every
//! file and then creates the book.

mod error;
mod service;
mod types;
mod upload;

pub use error::BookError;
pub use service::{BookRepository, BookService};
pub use types::{Book, BookMetadata, BookPatch, Chapter, CoverRef, CreateBookInput, NewBook};
pub use upload::{BookUpload, BookUploadForm, ChapterUpload, FormField, MAX_CHAPTERS, MAX_FILES};
