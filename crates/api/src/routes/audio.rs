//! Audio streaming route.

use audiobooks_shared::types::ObjectId;
use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::Response,
    routing::get,
};

use super::parse_id;
use crate::{AppState, error::ApiError, streaming};

/// Creates the audio routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/audio/{id}", get(stream_audio))
}

/// GET `/audio/{id}` - Stream a stored object, honouring `Range`.
async fn stream_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let id: ObjectId = parse_id(&id)?;
    let objects = state.objects();
    let object = objects.metadata(id).await?;

    // A header that is not visible ASCII cannot be a valid range
    let range = headers
        .get(header::RANGE)
        .map(|v| v.to_str().unwrap_or_default());

    streaming::serve_object(&objects, &object, range).await
}
