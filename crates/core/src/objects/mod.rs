//! Stored objects: immutable blobs plus their metadata records.
//!
//! Bytes go to the storage backend under a key derived from the object id;
//! the metadata record (filename, content type, length, kind) goes to the
//! repository. An object is visible once its metadata record exists.

mod error;
mod service;
mod types;

pub use error::ObjectError;
pub use service::{ObjectRepository, ObjectService};
pub use types::{DEFAULT_CONTENT_TYPE, NewObject, ObjectKind, StoredObject, UploadedFile};
