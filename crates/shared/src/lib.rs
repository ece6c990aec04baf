//! Shared types, errors, and configuration for the audiobooks service.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for books and stored objects
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
