//! Multipart form decoding.
//!
//! Parts are buffered one at a time; a part with a filename is a file,
//! anything else is text.

use audiobooks_core::books::BookUploadForm;
use audiobooks_core::objects::UploadedFile;
use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};

use crate::error::ApiError;

/// One decoded multipart part.
#[derive(Debug)]
pub enum Part {
    /// File part.
    File {
        /// Field name.
        name: String,
        /// File contents and declared type.
        file: UploadedFile,
    },
    /// Text part.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
}

/// Unwraps the multipart extractor, reporting a missing or malformed
/// `multipart/form-data` body as a 400.
pub fn accept(multipart: Result<Multipart, MultipartRejection>) -> Result<Multipart, ApiError> {
    multipart.map_err(|e| ApiError::bad_request(e.body_text()))
}

/// Reads the next part, or `None` at the end of the form.
///
/// # Errors
///
/// Returns a 400 if the body is not valid multipart or a part exceeds the
/// body limit.
pub async fn next_part(multipart: &mut Multipart) -> Result<Option<Part>, ApiError> {
    let Some(field) = multipart.next_field().await.map_err(multipart_error)? else {
        return Ok(None);
    };
    read_part(field).await.map(Some)
}

async fn read_part(field: Field<'_>) -> Result<Part, ApiError> {
    let name = field.name().unwrap_or_default().to_string();

    match field.file_name().map(str::to_string) {
        Some(filename) => {
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            Ok(Part::File {
                name,
                file: UploadedFile::new(filename, content_type, data),
            })
        }
        None => {
            let value = field.text().await.map_err(multipart_error)?;
            Ok(Part::Text { name, value })
        }
    }
}

/// Collects the integrated book upload form.
///
/// # Errors
///
/// Returns a 400 for unreadable multipart bodies or a chapter with two
/// audio files.
pub async fn read_book_form(mut multipart: Multipart) -> Result<BookUploadForm, ApiError> {
    let mut form = BookUploadForm::new();

    while let Some(part) = next_part(&mut multipart).await? {
        match part {
            Part::File { name, file } => form.push_file(&name, file)?,
            Part::Text { name, value } => form.push_text(&name, value),
        }
    }

    Ok(form)
}

/// Collects every file sent under `field`; other parts are ignored.
///
/// # Errors
///
/// Returns a 400 for unreadable multipart bodies.
pub async fn read_files(
    mut multipart: Multipart,
    field: &str,
) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();

    while let Some(part) = next_part(&mut multipart).await? {
        match part {
            Part::File { name, file } if name == field => files.push(file),
            Part::File { name, .. } | Part::Text { name, .. } => {
                tracing::debug!(field = %name, "Ignoring multipart field");
            }
        }
    }

    Ok(files)
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::bad_request(err.body_text())
}
