//! Note export service.
//!
//! Reads the latest edit of every note from the store and writes one HTML
//! file per note, stamped with the note's edit time. Failures on a single
//! note are reported and skipped; only store, query and output directory
//! failures stop the run.

use std::collections::HashMap;
use std::path::Path;

use colored::Colorize;

use crate::domain::{
    AppError, CollisionPolicy, ExportConfig, ExportSummary, GroupPolicy, NoteRecord, Result,
    RowFailure, StoreTimestamp,
};
use crate::infrastructure::{ensure_output_dir, write_note, NoteStoreReader, RawNoteRow};

/// Exports every note from the configured store into the output directory.
///
/// The store connection is opened here and released before this returns.
///
/// # Errors
/// Returns error if the store cannot be opened or queried, or the output
/// directory cannot be created. Per-note failures end up in the summary.
pub fn export_notes(config: &ExportConfig) -> Result<ExportSummary> {
    tracing::info!("Exporting from: {}", config.database.display());

    let (notes_in_store, rows) = {
        let reader = NoteStoreReader::open(&config.database)?;
        let count = reader.count_notes()?;
        (count, reader.fetch_latest_notes(config.group_by)?)
    };

    ensure_output_dir(&config.output_dir)?;

    let mut summary = ExportSummary {
        output_dir: config.output_dir.clone(),
        notes_in_store,
        rows_returned: rows.len(),
        collapsed_by_grouping: notes_in_store.saturating_sub(rows.len()),
        ..Default::default()
    };

    if summary.collapsed_by_grouping > 0 && config.group_by == GroupPolicy::CreationSecond {
        tracing::warn!(
            collapsed = summary.collapsed_by_grouping,
            "Notes sharing a creation second were merged; use --group-by note to export each one"
        );
    }

    let mut names = FileNamer::new(config.on_collision);

    for row in rows {
        match row.and_then(into_note) {
            Ok(note) => export_one(&config.output_dir, &note, &mut names, &mut summary),
            Err(e) => report_failure(&mut summary, None, None, &e),
        }
    }

    tracing::info!(
        written = summary.written,
        failed = summary.failed(),
        "Export finished"
    );

    Ok(summary)
}

/// Validates a raw query row.
fn into_note(raw: RawNoteRow) -> Result<NoteRecord> {
    let id = raw.id;
    let missing = |column: &str| AppError::invalid(format!("Note {id} has no {column}"));

    Ok(NoteRecord {
        id,
        title: raw.title.ok_or_else(|| missing("title"))?,
        html_body: raw.html_body.ok_or_else(|| missing("body"))?,
        last_edited: StoreTimestamp(raw.last_edited.ok_or_else(|| missing("edit time"))?),
    })
}

/// Writes a single note, recording the outcome in `summary`.
fn export_one(dir: &Path, note: &NoteRecord, names: &mut FileNamer, summary: &mut ExportSummary) {
    let file_name = match names.choose(note) {
        NameChoice::Fresh(name) => name,
        NameChoice::Overwrite { name, previous } => {
            tracing::warn!(note_id = note.id, previous, "Overwriting {name}");
            summary.overwritten += 1;
            name
        }
        NameChoice::Suffixed { name, previous } => {
            tracing::info!(note_id = note.id, previous, "Name taken, writing {name}");
            summary.suffixed += 1;
            name
        }
        NameChoice::Skip { name, previous } => {
            let err = AppError::invalid(format!(
                "{name} was already written for note {previous} in this run"
            ));
            report_failure(summary, Some(note.id), Some(name), &err);
            return;
        }
    };

    let Some(modified) = note.last_edited.to_system_time() else {
        let err = AppError::invalid(format!(
            "Note {} has an unrepresentable edit time {}",
            note.id, note.last_edited.0
        ));
        report_failure(summary, Some(note.id), Some(file_name), &err);
        return;
    };

    println!("Writing {file_name}...");
    tracing::debug!(
        note_id = note.id,
        edited = ?note.last_edited.to_datetime(),
        "Writing note"
    );

    match write_note(&dir.join(&file_name), &note.html_body, modified) {
        Ok(()) => {
            names.record(&file_name, note.id);
            summary.written += 1;
        }
        Err(e) => report_failure(summary, Some(note.id), Some(file_name), &e),
    }
}

fn report_failure(
    summary: &mut ExportSummary,
    note_id: Option<i64>,
    file_name: Option<String>,
    err: &AppError,
) {
    let label = file_name.as_deref().unwrap_or("<unnamed note>");
    eprintln!("{} {label}: {err}", "✗".red().bold());
    tracing::error!(note_id, error = ?err, "Failed to export note");

    summary.failures.push(RowFailure {
        note_id,
        file_name,
        error: err.to_string(),
    });
}

/// Outcome of picking a file name for a note.
#[derive(Debug, PartialEq, Eq)]
enum NameChoice {
    Fresh(String),
    Overwrite { name: String, previous: i64 },
    Suffixed { name: String, previous: i64 },
    Skip { name: String, previous: i64 },
}

/// Tracks file names written in this run and applies the collision policy.
///
/// Names are compared case-insensitively, since the notes usually land on a
/// case-insensitive filesystem where `Todo.html` and `TODO.html` are one file.
struct FileNamer {
    policy: CollisionPolicy,
    written: HashMap<String, i64>,
}

impl FileNamer {
    fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            written: HashMap::new(),
        }
    }

    fn choose(&self, note: &NoteRecord) -> NameChoice {
        let name = note.file_name();
        let Some(previous) = self.written_by(&name) else {
            return NameChoice::Fresh(name);
        };

        match self.policy {
            CollisionPolicy::Overwrite => NameChoice::Overwrite { name, previous },
            CollisionPolicy::Suffix => {
                let name = (1..)
                    .map(|attempt| note.suffixed_file_name(attempt))
                    .find(|candidate| self.written_by(candidate).is_none())
                    .unwrap_or(name);
                NameChoice::Suffixed { name, previous }
            }
            CollisionPolicy::Skip => NameChoice::Skip { name, previous },
        }
    }

    fn written_by(&self, name: &str) -> Option<i64> {
        self.written.get(&fold(name)).copied()
    }

    fn record(&mut self, name: &str, note_id: i64) {
        self.written.insert(fold(name), note_id);
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::notes_reader::fixture::{create_store, FixtureNote};
    use std::fs;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tempfile::{tempdir, TempDir};

    fn setup(notes: &[FixtureNote<'_>]) -> (TempDir, ExportConfig) {
        let dir = tempdir().unwrap();
        let database = dir.path().join("NotesV7.storedata");
        create_store(&database, notes);

        let config = ExportConfig {
            database,
            output_dir: dir.path().join("notes"),
            ..Default::default()
        };
        (dir, config)
    }

    fn unix(store_secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(store_secs + 978_307_200)
    }

    fn mtime(path: &Path) -> SystemTime {
        fs::metadata(path).unwrap().modified().unwrap()
    }

    #[test]
    fn test_exports_one_file_per_note_with_edit_time() {
        let (_dir, config) = setup(&[
            FixtureNote::new("Groceries", "<p>milk</p>", 10.0, 1_000.0),
            FixtureNote::new("Trips/2020", "<p>rome</p>", 20.0, 2_000.0),
        ]);

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 2);
        assert!(summary.is_clean());

        let groceries = config.output_dir.join("Groceries.html");
        let trips = config.output_dir.join("Trips+2020.html");
        assert_eq!(mtime(&groceries), unix(1_000));
        assert_eq!(mtime(&trips), unix(2_000));
        assert_eq!(fs::read_to_string(&groceries).unwrap(), "<p>milk</p>");
        assert_eq!(fs::read_to_string(&trips).unwrap(), "<p>rome</p>");
    }

    #[test]
    fn test_same_creation_second_collapses_to_latest_edit() {
        let (_dir, config) = setup(&[
            FixtureNote::new("Draft", "<p>draft</p>", 50.0, 100.0),
            FixtureNote::new("Final", "<p>final</p>", 50.0, 900.0),
        ]);

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.notes_in_store, 2);
        assert_eq!(summary.rows_returned, 1);
        assert_eq!(summary.collapsed_by_grouping, 1);
        assert!(!config.output_dir.join("Draft.html").exists());
        let path = config.output_dir.join("Final.html");
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>final</p>");
        assert_eq!(mtime(&path), unix(900));
    }

    #[test]
    fn test_note_grouping_exports_both() {
        let (_dir, mut config) = setup(&[
            FixtureNote::new("Draft", "<p>draft</p>", 50.0, 100.0),
            FixtureNote::new("Final", "<p>final</p>", 50.0, 900.0),
        ]);
        config.group_by = GroupPolicy::Note;

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.collapsed_by_grouping, 0);
        assert!(config.output_dir.join("Draft.html").exists());
    }

    #[test]
    fn test_failed_row_does_not_stop_the_others() {
        let (_dir, config) = setup(&[
            FixtureNote::new("A", "<p>a</p>", 1.0, 11.0),
            FixtureNote::new("B", "<p>b</p>", 2.0, 22.0),
            FixtureNote::new("C", "<p>c</p>", 3.0, 33.0),
        ]);
        // A directory in the way makes opening B.html fail.
        fs::create_dir_all(config.output_dir.join("B.html")).unwrap();

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.failures[0].file_name.as_deref(), Some("B.html"));
        assert_eq!(summary.failures[0].note_id, Some(2));

        let a = config.output_dir.join("A.html");
        let c = config.output_dir.join("C.html");
        assert_eq!(mtime(&a), unix(11));
        assert_eq!(mtime(&c), unix(33));
        assert_eq!(fs::read_to_string(a).unwrap(), "<p>a</p>");
        assert_eq!(fs::read_to_string(c).unwrap(), "<p>c</p>");
    }

    #[test]
    fn test_rows_with_nulls_are_reported() {
        let (_dir, config) = setup(&[
            FixtureNote {
                title: None,
                body: Some("<p>orphan</p>"),
                created: 1.0,
                edited: Some(5.0),
            },
            FixtureNote {
                title: Some("No edit time"),
                body: Some("x"),
                created: 2.0,
                edited: None,
            },
            FixtureNote::new("Fine", "<p>ok</p>", 3.0, 7.0),
        ]);

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.failed(), 2);
        assert!(summary.failures.iter().all(|f| f.file_name.is_none()));
        assert!(summary.failures.iter().any(|f| f.error.contains("title")));
        assert!(config.output_dir.join("Fine.html").exists());
    }

    #[test]
    fn test_rerun_is_identical() {
        let (_dir, config) = setup(&[
            FixtureNote::new("One", "<p>1</p>", 1.0, 100.0),
            FixtureNote::new("Two", "<p>2</p>", 2.0, 200.0),
        ]);

        export_notes(&config).unwrap();
        let first: Vec<(Vec<u8>, SystemTime)> = ["One.html", "Two.html"]
            .iter()
            .map(|n| {
                let p = config.output_dir.join(n);
                (fs::read(&p).unwrap(), mtime(&p))
            })
            .collect();

        export_notes(&config).unwrap();
        let second: Vec<(Vec<u8>, SystemTime)> = ["One.html", "Two.html"]
            .iter()
            .map(|n| {
                let p = config.output_dir.join(n);
                (fs::read(&p).unwrap(), mtime(&p))
            })
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_output_dir_is_kept() {
        let (_dir, config) = setup(&[FixtureNote::new("New", "<p>n</p>", 1.0, 2.0)]);
        fs::create_dir_all(&config.output_dir).unwrap();
        fs::write(config.output_dir.join("unrelated.txt"), "hello").unwrap();

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(
            fs::read_to_string(config.output_dir.join("unrelated.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_collision_overwrite_keeps_later_note() {
        let (_dir, config) = setup(&[
            FixtureNote::new("a/b", "<p>first</p>", 1.0, 10.0),
            FixtureNote::new("a+b", "<p>second</p>", 2.0, 20.0),
        ]);

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.overwritten, 1);
        let path = config.output_dir.join("a+b.html");
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>second</p>");
    }

    #[test]
    fn test_collision_suffix_keeps_both() {
        let (_dir, mut config) = setup(&[
            FixtureNote::new("a/b", "<p>first</p>", 1.0, 10.0),
            FixtureNote::new("a+b", "<p>second</p>", 2.0, 20.0),
        ]);
        config.on_collision = CollisionPolicy::Suffix;

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.suffixed, 1);
        assert_eq!(
            fs::read_to_string(config.output_dir.join("a+b.html")).unwrap(),
            "<p>first</p>"
        );
        assert_eq!(
            fs::read_to_string(config.output_dir.join("a+b-2.html")).unwrap(),
            "<p>second</p>"
        );
    }

    #[test]
    fn test_collision_skip_reports_failure() {
        let (_dir, mut config) = setup(&[
            FixtureNote::new("a/b", "<p>first</p>", 1.0, 10.0),
            FixtureNote::new("a+b", "<p>second</p>", 2.0, 20.0),
        ]);
        config.on_collision = CollisionPolicy::Skip;

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.failures[0].note_id, Some(2));
        assert_eq!(
            fs::read_to_string(config.output_dir.join("a+b.html")).unwrap(),
            "<p>first</p>"
        );
    }

    #[test]
    fn test_missing_store_is_fatal_and_creates_nothing() {
        let dir = tempdir().unwrap();
        let config = ExportConfig {
            database: dir.path().join("missing.storedata"),
            output_dir: dir.path().join("notes"),
            ..Default::default()
        };

        let result = export_notes(&config);

        assert!(matches!(result, Err(AppError::DatabaseNotFound { .. })));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_namer_records_only_written_names() {
        let mut namer = FileNamer::new(CollisionPolicy::Skip);
        let note = NoteRecord {
            id: 7,
            title: "x".into(),
            html_body: String::new(),
            last_edited: StoreTimestamp(0.0),
        };

        assert_eq!(namer.choose(&note), NameChoice::Fresh("x.html".into()));
        namer.record("x.html", 7);
        assert_eq!(
            namer.choose(&note),
            NameChoice::Skip {
                name: "x.html".into(),
                previous: 7
            }
        );
    }

    #[test]
    fn test_collision_suffix_never_reuses_a_written_name() {
        let (_dir, mut config) = setup(&[
            FixtureNote::new("a+b-3", "<p>real title</p>", 1.0, 10.0),
            FixtureNote::new("a/b", "<p>first</p>", 2.0, 20.0),
            FixtureNote::new("a+b", "<p>second</p>", 3.0, 30.0),
        ]);
        config.on_collision = CollisionPolicy::Suffix;

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 3);
        assert_eq!(summary.suffixed, 1);
        assert_eq!(summary.overwritten, 0);
        assert!(summary.is_clean());
        assert_eq!(
            fs::read_to_string(config.output_dir.join("a+b-3.html")).unwrap(),
            "<p>real title</p>"
        );
        assert_eq!(
            fs::read_to_string(config.output_dir.join("a+b.html")).unwrap(),
            "<p>first</p>"
        );
        assert_eq!(
            fs::read_to_string(config.output_dir.join("a+b-3-2.html")).unwrap(),
            "<p>second</p>"
        );
    }

    #[test]
    fn test_names_differing_only_in_case_collide() {
        let (_dir, mut config) = setup(&[
            FixtureNote::new("Todo", "<p>lower</p>", 1.0, 10.0),
            FixtureNote::new("TODO", "<p>upper</p>", 2.0, 20.0),
        ]);
        config.on_collision = CollisionPolicy::Suffix;

        let summary = export_notes(&config).unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.suffixed, 1);
        assert_eq!(
            fs::read_to_string(config.output_dir.join("Todo.html")).unwrap(),
            "<p>lower</p>"
        );
        assert_eq!(
            fs::read_to_string(config.output_dir.join("TODO-2.html")).unwrap(),
            "<p>upper</p>"
        );
    }

    #[test]
    fn test_output_dir_creation_failure_is_fatal() {
        let (dir, mut config) = setup(&[FixtureNote::new("A", "<p>a</p>", 1.0, 11.0)]);
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "plain file").unwrap();
        config.output_dir = blocker.join("notes");

        let result = export_notes(&config);

        assert!(matches!(result, Err(AppError::Io { .. })));
        let html_files = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
            .count();
        assert_eq!(html_files, 0);
    }
}
