//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for books, uploads and audio streaming
//! - Range-aware streaming of stored objects
//! - JSON error responses

pub mod error;
pub mod multipart;
pub mod routes;
pub mod streaming;

use std::sync::Arc;

use audiobooks_core::books::BookService;
use audiobooks_core::objects::ObjectService;
use audiobooks_core::storage::StorageService;
use audiobooks_db::{BookRepository, StoredObjectRepository};
use audiobooks_shared::config::ServerConfig;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Blob storage for stored objects.
    pub storage: Arc<StorageService>,
}

impl AppState {
    /// Creates the state from its parts.
    #[must_use]
    pub fn new(db: DatabaseConnection, storage: StorageService) -> Self {
        Self {
            db: Arc::new(db),
            storage: Arc::new(storage),
        }
    }

    /// Object service over the shared pool and storage.
    #[must_use]
    pub fn objects(&self) -> ObjectService<StoredObjectRepository> {
        ObjectService::new(
            Arc::clone(&self.storage),
            Arc::new(StoredObjectRepository::new(Arc::clone(&self.db))),
        )
    }

    /// Book service over the shared pool and storage.
    #[must_use]
    pub fn books(&self) -> BookService<BookRepository, StoredObjectRepository> {
        BookService::new(
            Arc::new(BookRepository::new(Arc::clone(&self.db))),
            self.objects(),
        )
    }
}

/// Creates the main application router.
///
/// API routes live under `/api`; any other path is served from
/// `server.static_dir` when one is configured.
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = Router::new().nest("/api", routes::api_routes());

    if let Some(dir) = &server.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}
