//! Range-aware streaming of stored objects.
//!
//! Resolves the request's `Range` header against the object length, then
//! answers with one of:
//!
//! | Outcome         | Status | Extra headers                      | Body            |
//! |-----------------|--------|------------------------------------|-----------------|
//! | `FullySent`     | 200    |                                    | whole object    |
//! | `PartiallySent` | 206    | `Content-Range: bytes s-e/len`     | bytes `s..=e`   |
//! | `RangeRejected` | 416    | `Content-Range: bytes */len`       | empty           |
//!
//! Bodies are streamed from storage chunk by chunk. A storage failure after
//! the headers are sent, or a source that ends early, fails the body so the
//! connection is aborted rather than completed short.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use audiobooks_core::objects::{DEFAULT_CONTENT_TYPE, ObjectRepository, ObjectService, StoredObject};
use audiobooks_core::range::{ByteRange, resolve_range};
use audiobooks_shared::AppError;
use audiobooks_shared::types::ObjectId;
use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use futures::Stream;
use pin_project::{pin_project, pinned_drop};

use crate::error::ApiError;

/// Terminal state of one object response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Whole object served with 200.
    FullySent,
    /// Resolved window served with 206.
    PartiallySent,
    /// Range header rejected with 416.
    RangeRejected,
}

impl StreamOutcome {
    /// Label used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullySent => "fully_sent",
            Self::PartiallySent => "partially_sent",
            Self::RangeRejected => "range_rejected",
        }
    }
}

/// Serves `object`, honouring an optional `Range` header value.
///
/// # Errors
///
/// Returns a 416 error for a malformed or unsatisfiable range, or a storage
/// error if the object cannot be opened. Nothing has been sent in either case.
pub async fn serve_object<R: ObjectRepository>(
    objects: &ObjectService<R>,
    object: &StoredObject,
    range_header: Option<&str>,
) -> Result<Response, ApiError> {
    let length = object.length;

    let window = match resolve_range(range_header, length) {
        Ok(window) => window,
        Err(e) => {
            tracing::info!(
                object_id = %object.id,
                outcome = StreamOutcome::RangeRejected.as_str(),
                error = %e,
                "Object response finished"
            );
            return Err(AppError::RangeNotSatisfiable { length }.into());
        }
    };

    let source = objects.open(object, window).await?;
    build_response(object, window, source)
}

/// Builds the 200 or 206 response streaming `source`, which must yield the
/// bytes of `window` (or of the whole object).
pub(crate) fn build_response<S>(
    object: &StoredObject,
    window: Option<ByteRange>,
    source: S,
) -> Result<Response, ApiError>
where
    S: Stream<Item = io::Result<Bytes>> + Send + 'static,
{
    let length = object.length;
    let (status, outcome, content_length) = match window {
        Some(w) => (StatusCode::PARTIAL_CONTENT, StreamOutcome::PartiallySent, w.byte_count()),
        None => (StatusCode::OK, StreamOutcome::FullySent, length),
    };

    let body = Body::from_stream(TrackedStream::new(source, object.id, outcome, content_length));

    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&object.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));
    if let Some(w) = window {
        headers.insert(header::CONTENT_RANGE, content_range_value(w, length)?);
    }

    Ok(response)
}

fn content_range_value(window: ByteRange, length: u64) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&window.content_range(length))
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))
}

/// Body stream that enforces the promised length and logs how it ended.
///
/// Never yields more than `expected` bytes. A source that ends short yields
/// an `UnexpectedEof` error. Dropping the stream before it finishes (client
/// went away) drops the source with it.
#[pin_project(PinnedDrop)]
pub struct TrackedStream<S> {
    #[pin]
    source: S,
    object_id: ObjectId,
    outcome: StreamOutcome,
    expected: u64,
    sent: u64,
    finished: bool,
}

impl<S> TrackedStream<S> {
    /// Wraps `source`, which should deliver exactly `expected` bytes.
    pub fn new(source: S, object_id: ObjectId, outcome: StreamOutcome, expected: u64) -> Self {
        Self {
            source,
            object_id,
            outcome,
            expected,
            sent: 0,
            finished: false,
        }
    }
}

impl<S> Stream for TrackedStream<S>
where
    S: Stream<Item = io::Result<Bytes>>,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        if *this.finished {
            return Poll::Ready(None);
        }

        match ready!(this.source.poll_next(cx)) {
            Some(Ok(chunk)) => {
                let remaining = *this.expected - *this.sent;
                let chunk = if chunk.len() as u64 > remaining {
                    chunk.slice(..usize::try_from(remaining).unwrap_or(usize::MAX))
                } else {
                    chunk
                };
                *this.sent += chunk.len() as u64;

                if *this.sent == *this.expected {
                    *this.finished = true;
                    tracing::info!(
                        object_id = %this.object_id,
                        outcome = this.outcome.as_str(),
                        bytes = *this.sent,
                        "Object response finished"
                    );
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(e)) => {
                *this.finished = true;
                tracing::warn!(
                    object_id = %this.object_id,
                    bytes = *this.sent,
                    expected = *this.expected,
                    error = %e,
                    "Object stream aborted by storage error"
                );
                Poll::Ready(Some(Err(e)))
            }
            None => {
                *this.finished = true;
                if *this.sent < *this.expected {
                    tracing::warn!(
                        object_id = %this.object_id,
                        bytes = *this.sent,
                        expected = *this.expected,
                        "Object stream ended early"
                    );
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "object {} ended after {} of {} bytes",
                            this.object_id, this.sent, this.expected
                        ),
                    ))));
                }
                tracing::info!(
                    object_id = %this.object_id,
                    outcome = this.outcome.as_str(),
                    bytes = *this.sent,
                    "Object response finished"
                );
                Poll::Ready(None)
            }
        }
    }
}

#[pinned_drop]
impl<S> PinnedDrop for TrackedStream<S> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if !*this.finished {
            tracing::debug!(
                object_id = %this.object_id,
                bytes = *this.sent,
                expected = *this.expected,
                "Object stream dropped before completion"
            );
        }
    }
}
