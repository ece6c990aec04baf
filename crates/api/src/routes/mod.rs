//! API route definitions.

use axum::Router;

use crate::AppState;
use crate::error::ApiError;

pub mod audio;
pub mod books;
pub mod health;
pub mod upload;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(books::routes())
        .merge(upload::routes())
        .merge(audio::routes())
}

/// Parses a path id, reporting malformed ids as a 400.
pub(crate) fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request("Invalid ID"))
}
