//! Core domain logic for the audiobooks service.
//!
//! This crate contains pure domain logic with ZERO web or database dependencies.
//! Persistence is reached through repository traits implemented by the db crate.
//!
//! # Modules
//!
//! - `range` - HTTP byte-range resolution against a known object length
//! - `storage` - Vendor-agnostic object storage (OpenDAL)
//! - `objects` - Stored objects: immutable blobs plus their metadata
//! - `books` - Audiobook records, chapter playlists and the upload schema

pub mod books;
pub mod objects;
pub mod range;
pub mod storage;
