//! Application layer - use cases and orchestration.
//!
//! This layer contains the export routine and summary formatting.

pub mod exporter;
pub mod formatter;

pub use exporter::export_notes;
pub use formatter::{format_summary_json, format_summary_text, SummaryFormat};
