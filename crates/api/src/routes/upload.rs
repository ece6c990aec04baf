//! Generic file upload route.

use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    routing::post,
};
use serde::Serialize;

use crate::{AppState, error::ApiError, multipart};
use audiobooks_core::objects::ObjectKind;
use audiobooks_shared::types::ObjectId;

/// Multipart field carrying the files.
const FILES_FIELD: &str = "files";

/// Creates the upload routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_files))
}

/// One stored file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedEntry {
    /// Stored object id.
    pub file_id: ObjectId,
    /// Original filename.
    pub filename: String,
}

/// Response for a generic upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Stored files, in upload order.
    pub uploaded: Vec<UploadedEntry>,
}

/// POST `/upload` - Store every file sent under `files`.
async fn upload_files(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let files = multipart::read_files(multipart::accept(multipart)?, FILES_FIELD).await?;
    if files.is_empty() {
        return Err(ApiError::bad_request("No files uploaded"));
    }

    let objects = state.objects();
    let mut uploaded = Vec::with_capacity(files.len());
    for file in files {
        let object = objects.store(file, ObjectKind::File, None).await?;
        uploaded.push(UploadedEntry {
            file_id: object.id,
            filename: object.filename,
        });
    }

    tracing::info!(count = uploaded.len(), "Files uploaded");
    Ok(Json(UploadResponse { uploaded }))
}
