//! Domain models for exported notes.
//!
//! These models represent what the aggregation query yields and what a run
//! reports back.

use std::path::PathBuf;

use serde::Serialize;

use super::epoch::StoreTimestamp;

/// Extension given to every exported file.
pub const NOTE_EXTENSION: &str = "html";

/// A single note ready to be written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRecord {
    /// Primary key of the note row that supplied title and body.
    pub id: i64,
    /// Note title as stored.
    pub title: String,
    /// Raw HTML body, written out unescaped.
    pub html_body: String,
    /// Latest edit time within the note's group.
    pub last_edited: StoreTimestamp,
}

impl NoteRecord {
    /// Title with every `/` replaced by `+`.
    ///
    /// No other sanitization happens: the result is used verbatim as a file stem.
    #[must_use]
    pub fn file_stem(&self) -> String {
        sanitize_title(&self.title)
    }

    /// File name for this note, `<sanitized title>.html`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{NOTE_EXTENSION}", self.file_stem())
    }

    /// File name disambiguated with the note id, `<sanitized title>-<id>.html`.
    ///
    /// Attempts after the first append a counter: `<sanitized title>-<id>-<attempt>.html`.
    #[must_use]
    pub fn suffixed_file_name(&self, attempt: u32) -> String {
        if attempt <= 1 {
            format!("{}-{}.{NOTE_EXTENSION}", self.file_stem(), self.id)
        } else {
            format!("{}-{}-{attempt}.{NOTE_EXTENSION}", self.file_stem(), self.id)
        }
    }
}

/// Replaces path separators in a title so it can be used as a file name.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    title.replace('/', "+")
}

/// A note that could not be exported.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// Note id, when the row got far enough to have one.
    pub note_id: Option<i64>,
    /// Target file name, when it could be derived.
    pub file_name: Option<String>,
    /// Human-readable error.
    pub error: String,
}

/// Outcome of one export run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    /// Directory files were written to.
    pub output_dir: PathBuf,
    /// Joined note rows in the store, before grouping.
    pub notes_in_store: usize,
    /// Rows returned by the aggregation query.
    pub rows_returned: usize,
    /// Notes merged away by creation-time grouping.
    pub collapsed_by_grouping: usize,
    /// Files successfully written and timestamped.
    pub written: usize,
    /// Writes that replaced a file produced earlier in the same run.
    pub overwritten: usize,
    /// Notes written under a disambiguated file name.
    pub suffixed: usize,
    /// Per-row failures, in processing order.
    pub failures: Vec<RowFailure>,
}

impl ExportSummary {
    /// Number of rows that could not be exported.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether every returned row produced a file.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
