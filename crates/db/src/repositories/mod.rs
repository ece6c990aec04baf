//! Repository implementations for data access.
//!
//! Repositories implement the persistence traits declared in the core crate,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod book;
pub mod stored_object;

pub use book::BookRepository;
pub use stored_object::StoredObjectRepository;
