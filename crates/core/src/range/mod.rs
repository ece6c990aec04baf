//! HTTP byte-range resolution.
//!
//! Resolves a `Range` request header against the total length of a stored
//! object. Only the single-range form `bytes=<start>-[<end>]` is accepted;
//! anything else is rejected rather than silently served in full.

#[cfg(test)]
mod props;

use thiserror::Error;

/// Unit prefix of every accepted range header.
const BYTES_UNIT: &str = "bytes=";

/// Inclusive byte window within an object.
///
/// Always satisfies `start <= end`; when produced by [`resolve_range`] it also
/// satisfies `end < length` for the object it was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Creates a window, or `None` when `start > end`.
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Option<Self> {
        if start > end {
            None
        } else {
            Some(Self { start, end })
        }
    }

    /// Number of bytes in the window; never zero.
    #[must_use]
    pub const fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Half-open range for storage readers.
    #[must_use]
    pub const fn as_std(&self) -> std::ops::Range<u64> {
        self.start..self.end + 1
    }

    /// `Content-Range` header value for this window.
    #[must_use]
    pub fn content_range(&self, length: u64) -> String {
        format!("bytes {}-{}/{length}", self.start, self.end)
    }
}

/// `Content-Range` value sent with a 416 response.
#[must_use]
pub fn unsatisfied_content_range(length: u64) -> String {
    format!("bytes */{length}")
}

/// Reasons a present `Range` header cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Header does not match `bytes=<digits>-<digits?>`.
    #[error("malformed range header: {0}")]
    Malformed(String),

    /// Syntactically valid, but outside the object.
    #[error("range starting at byte {start} not satisfiable for {length} bytes")]
    NotSatisfiable {
        /// Requested first byte.
        start: u64,
        /// Requested last byte, if given.
        end: Option<u64>,
        /// Total object length.
        length: u64,
    },
}

impl RangeError {
    fn malformed(header: &str) -> Self {
        Self::Malformed(header.to_string())
    }
}

/// Resolves an optional `Range` header against an object of `length` bytes.
///
/// - `Ok(None)`: no header, serve the whole object.
/// - `Ok(Some(range))`: serve `range`, with `range.end < length`.
/// - `Err(RangeError::Malformed)`: header present but not `bytes=<start>-[<end>]`.
/// - `Err(RangeError::NotSatisfiable)`: `start >= length` or `start > end`.
///
/// An omitted end resolves to `length - 1`; an end past the object is clamped
/// to `length - 1`.
///
/// # Examples
/// ```
/// use audiobooks_core::range::{resolve_range, ByteRange};
///
/// let range = resolve_range(Some("bytes=200-299"), 1000).unwrap();
/// assert_eq!(range, ByteRange::new(200, 299));
///
/// assert_eq!(resolve_range(None, 1000).unwrap(), None);
/// assert!(resolve_range(Some("bytes=1000-1100"), 1000).is_err());
/// ```
pub fn resolve_range(header: Option<&str>, length: u64) -> Result<Option<ByteRange>, RangeError> {
    let Some(raw) = header else {
        return Ok(None);
    };

    let Some(spec) = raw.strip_prefix(BYTES_UNIT) else {
        return Err(RangeError::malformed(raw));
    };

    // Multi-range requests are not served
    if spec.contains(',') {
        return Err(RangeError::malformed(raw));
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return Err(RangeError::malformed(raw));
    };

    // Suffix ranges ("bytes=-500") need a start offset here
    let Some(start) = parse_offset(start_str) else {
        return Err(RangeError::malformed(raw));
    };

    let end = if end_str.is_empty() {
        None
    } else {
        let Some(end) = parse_offset(end_str) else {
            return Err(RangeError::malformed(raw));
        };
        Some(end)
    };

    if start >= length {
        return Err(RangeError::NotSatisfiable { start, end, length });
    }

    let last = length - 1;
    let resolved_end = end.map_or(last, |e| e.min(last));

    ByteRange::new(start, resolved_end)
        .map(Some)
        .ok_or(RangeError::NotSatisfiable { start, end, length })
}

/// Parses a decimal offset; overlong digit strings saturate at `u64::MAX`.
fn parse_offset(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse::<u64>().unwrap_or(u64::MAX))
}
