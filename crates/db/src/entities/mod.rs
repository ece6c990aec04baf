//! `SeaORM` entity definitions.

pub mod books;
pub mod stored_objects;
