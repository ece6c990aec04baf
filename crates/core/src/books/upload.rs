//! Typed schema for the integrated book upload form.
//!
//! Multipart parts arrive one at a time and are pushed into a
//! [`BookUploadForm`]. [`BookUploadForm::validate`] then checks the whole
//! form and yields a [`BookUpload`], before any object is stored.
//!
//! Field names:
//!
//! ```text
//! cover                   file, required
//! metadata                text, JSON {"title", "author"?, "summary"?}
//! chapters[<n>][audio]    file, at least one, at most 30
//! chapters[<n>][title]    text, default "Chapter <n+1>"
//! chapters[<n>][order]    text, integer, default <n+1>
//! ```

use std::collections::BTreeMap;

use super::error::BookError;
use super::types::BookMetadata;
use crate::objects::UploadedFile;

/// Maximum number of chapters in one upload.
pub const MAX_CHAPTERS: usize = 30;

/// Maximum number of file parts in one upload: the chapters plus the cover.
pub const MAX_FILES: usize = MAX_CHAPTERS + 1;

/// A multipart field name, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// `cover`
    Cover,
    /// `metadata`
    Metadata,
    /// `chapters[n][audio]`
    ChapterAudio(u16),
    /// `chapters[n][title]`
    ChapterTitle(u16),
    /// `chapters[n][order]`
    ChapterOrder(u16),
    /// Anything else; ignored.
    Unknown,
}

impl FormField {
    /// Decodes a multipart field name.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "cover" => Self::Cover,
            "metadata" => Self::Metadata,
            _ => Self::parse_chapter(name).unwrap_or(Self::Unknown),
        }
    }

    fn parse_chapter(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("chapters[")?;
        let (index, rest) = rest.split_once("][")?;
        let part = rest.strip_suffix(']')?;

        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index: u16 = index.parse().ok()?;

        match part {
            "audio" => Some(Self::ChapterAudio(index)),
            "title" => Some(Self::ChapterTitle(index)),
            "order" => Some(Self::ChapterOrder(index)),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ChapterDraft {
    audio: Option<UploadedFile>,
    title: Option<String>,
    order: Option<String>,
}

/// Multipart form being collected.
#[derive(Debug, Default)]
pub struct BookUploadForm {
    file_count: usize,
    cover: Option<UploadedFile>,
    metadata: Option<String>,
    chapters: BTreeMap<u16, ChapterDraft>,
}

/// Validated upload, ready to be stored.
#[derive(Debug, Clone)]
pub struct BookUpload {
    /// Book title, non-blank.
    pub title: String,
    /// Author.
    pub author: Option<String>,
    /// Summary.
    pub summary: Option<String>,
    /// Cover image.
    pub cover: UploadedFile,
    /// Chapters in field-index order.
    pub chapters: Vec<ChapterUpload>,
}

/// One validated chapter.
#[derive(Debug, Clone)]
pub struct ChapterUpload {
    /// 1-based chapter number (field index + 1).
    pub number: i32,
    /// Audio payload.
    pub audio: UploadedFile,
    /// Chapter title.
    pub title: String,
    /// Playlist sort key.
    pub order: i32,
}

impl BookUploadForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file part.
    ///
    /// # Errors
    ///
    /// Returns an error if the form already holds [`MAX_FILES`] files, or if
    /// the same chapter carries two audio files.
    pub fn push_file(&mut self, name: &str, file: UploadedFile) -> Result<(), BookError> {
        if self.file_count >= MAX_FILES {
            return Err(BookError::invalid_upload("Too many files"));
        }
        self.file_count += 1;

        match FormField::parse(name) {
            FormField::Cover => {
                if self.cover.is_some() {
                    tracing::debug!(filename = %file.filename, "Ignoring extra cover file");
                } else {
                    self.cover = Some(file);
                }
            }
            FormField::ChapterAudio(index) => {
                let draft = self.chapters.entry(index).or_default();
                if draft.audio.is_some() {
                    return Err(BookError::invalid_upload(format!(
                        "Chapter {} has more than one audio file",
                        u32::from(index) + 1
                    )));
                }
                draft.audio = Some(file);
            }
            FormField::Metadata
            | FormField::ChapterTitle(_)
            | FormField::ChapterOrder(_)
            | FormField::Unknown => {
                tracing::debug!(field = name, "Ignoring file in unexpected field");
            }
        }
        Ok(())
    }

    /// Adds a text part.
    pub fn push_text(&mut self, name: &str, value: String) {
        match FormField::parse(name) {
            FormField::Metadata => self.metadata = Some(value),
            FormField::ChapterTitle(index) => {
                self.chapters.entry(index).or_default().title = Some(value);
            }
            FormField::ChapterOrder(index) => {
                self.chapters.entry(index).or_default().order = Some(value);
            }
            FormField::Cover | FormField::ChapterAudio(_) | FormField::Unknown => {
                tracing::debug!(field = name, "Ignoring text in unexpected field");
            }
        }
    }

    /// Number of file parts received so far.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Validates the collected form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUpload` for a missing cover, unreadable metadata, no
    /// or too many chapters, or a chapter without audio; `Validation` for a
    /// missing title.
    pub fn validate(self) -> Result<BookUpload, BookError> {
        if self.file_count == 0 {
            return Err(BookError::invalid_upload("No files uploaded"));
        }

        let Some(cover) = self.cover else {
            return Err(BookError::invalid_upload("Cover image is required"));
        };

        let metadata = parse_metadata(self.metadata.as_deref())?;

        let audio_count = self.chapters.values().filter(|c| c.audio.is_some()).count();
        if audio_count == 0 {
            return Err(BookError::invalid_upload(
                "At least one audio file is required",
            ));
        }
        if audio_count > MAX_CHAPTERS {
            return Err(BookError::invalid_upload(format!(
                "A maximum of {MAX_CHAPTERS} chapters is allowed"
            )));
        }

        let title = metadata
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BookError::validation("title is required"))?;

        let mut chapters = Vec::with_capacity(audio_count);
        for (index, draft) in self.chapters {
            let number = i32::from(index) + 1;
            let Some(audio) = draft.audio else {
                return Err(BookError::invalid_upload(format!(
                    "Chapter {number} has no audio file"
                )));
            };

            let title = draft
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| format!("Chapter {number}"));
            let order = draft.order.as_deref().and_then(parse_order).unwrap_or(number);

            chapters.push(ChapterUpload {
                number,
                audio,
                title,
                order,
            });
        }

        Ok(BookUpload {
            title,
            author: metadata.author,
            summary: metadata.summary,
            cover,
            chapters,
        })
    }
}

fn parse_metadata(raw: Option<&str>) -> Result<BookMetadata, BookError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("{}");
    serde_json::from_str(raw).map_err(|_| {
        BookError::invalid_upload("Invalid metadata. Send valid JSON in the \"metadata\" field.")
    })
}

/// Leading integer of `raw`, ignoring trailing garbage; zero counts as absent.
fn parse_order(raw: &str) -> Option<i32> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok().filter(|&v| v != 0)
}
