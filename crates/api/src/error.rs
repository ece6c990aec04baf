//! JSON error responses.

use audiobooks_core::range::unsatisfied_content_range;
use audiobooks_shared::AppError;
use axum::Json;
use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error returned by handlers; renders as `{"error": message}`.
///
/// A `RangeNotSatisfiable` error renders as an empty 416 carrying
/// `Content-Range: bytes */<length>` instead.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Malformed client input.
    #[must_use]
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(AppError::BadRequest(msg.into()))
    }
}

impl<E: Into<AppError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let AppError::RangeNotSatisfiable { length } = self.0 {
            return range_not_satisfiable(length);
        }

        if self.0.is_server_error() {
            tracing::error!(code = self.0.error_code(), error = %self.0, "Request failed");
        } else {
            tracing::debug!(code = self.0.error_code(), error = %self.0, "Request rejected");
        }

        (status, Json(json!({ "error": self.0.client_message() }))).into_response()
    }
}

fn range_not_satisfiable(length: u64) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::RANGE_NOT_SATISFIABLE;

    let content_range = HeaderValue::from_str(&unsatisfied_content_range(length))
        .unwrap_or_else(|_| HeaderValue::from_static("bytes */0"));
    response
        .headers_mut()
        .insert(header::CONTENT_RANGE, content_range);
    response
        .headers_mut()
        .insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    response
}
