//! Output formatting for export summaries.
//!
//! Supports a human-readable text view and JSON.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::ExportSummary;

/// Summary format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryFormat {
    /// Colored headline plus tables.
    #[default]
    Text,
    /// JSON for programmatic use.
    Json,
}

impl std::str::FromStr for SummaryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: text, json")),
        }
    }
}

/// Formats a summary as text.
pub fn format_summary_text(summary: &ExportSummary) -> String {
    let headline = if summary.is_clean() {
        format!(
            "{} Exported {} notes to {}/",
            "✓".green().bold(),
            summary.written,
            summary.output_dir.display()
        )
    } else {
        format!(
            "{} Exported {} notes to {}/, {} failed",
            "!".yellow().bold(),
            summary.written,
            summary.output_dir.display(),
            summary.failed().to_string().red()
        )
    };

    let mut counts = Table::new();
    counts.load_preset(UTF8_FULL);
    counts.set_header(vec!["", "Notes"]);
    counts.add_row(vec!["In store".to_string(), summary.notes_in_store.to_string()]);
    counts.add_row(vec![
        "Merged by creation time".to_string(),
        summary.collapsed_by_grouping.to_string(),
    ]);
    counts.add_row(vec!["Written".to_string(), summary.written.to_string()]);
    counts.add_row(vec!["Overwritten".to_string(), summary.overwritten.to_string()]);
    counts.add_row(vec!["Renamed".to_string(), summary.suffixed.to_string()]);
    counts.add_row(vec!["Failed".to_string(), summary.failed().to_string()]);

    let mut out = format!("{headline}\n{counts}");

    if !summary.is_clean() {
        let mut failures = Table::new();
        failures.load_preset(UTF8_FULL);
        failures.set_header(vec!["Note", "File", "Error"]);
        for failure in &summary.failures {
            failures.add_row(vec![
                failure
                    .note_id
                    .map_or_else(|| "-".to_string(), |id| id.to_string()),
                failure.file_name.clone().unwrap_or_else(|| "-".to_string()),
                failure.error.clone(),
            ]);
        }
        out.push('\n');
        out.push_str(&failures.to_string());
    }

    out
}

/// Formats a summary as pretty JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_summary_json(summary: &ExportSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}
