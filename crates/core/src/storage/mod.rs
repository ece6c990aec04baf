//! Blob storage for stored objects using Apache OpenDAL.
//!
//! Every object's bytes live under `{key_prefix}/{object_id}` in one of:
//! - S3-compatible stores (MinIO, Cloudflare R2, AWS S3)
//! - Azure Blob Storage
//! - Local filesystem
//! - Process memory (tests)
//!
//! Metadata lives in the database; this module only moves bytes.

mod error;
mod service;

pub use audiobooks_shared::config::{StorageProvider, StorageSettings};
pub use error::StorageError;
pub use service::{ByteStream, StorageService};
