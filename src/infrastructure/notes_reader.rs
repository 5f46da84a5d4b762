//! `SQLite` reader for the NotesV7 note store.
//!
//! Runs the aggregation query joining `ZNOTE` with `ZNOTEBODY`.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, Row};

use crate::domain::{AppError, GroupPolicy, Result, STORE_EPOCH_OFFSET};

/// A query row before validation; any column may be NULL in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNoteRow {
    pub id: i64,
    pub title: Option<String>,
    pub html_body: Option<String>,
    pub last_edited: Option<f64>,
}

/// Read-only reader over a note store.
pub struct NoteStoreReader {
    conn: Connection,
}

impl NoteStoreReader {
    /// Opens a note store in read-only mode.
    ///
    /// # Errors
    /// Returns error if the file is missing or cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(AppError::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(path, flags).map_err(AppError::database)?;

        conn.execute_batch(
            "PRAGMA query_only = ON;
             PRAGMA temp_store = MEMORY;",
        )
        .map_err(AppError::database)?;

        tracing::debug!("Opened note store: {}", path.display());

        Ok(Self { conn })
    }

    /// Counts joined note rows, before any grouping.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn count_notes(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM ZNOTE INNER JOIN ZNOTEBODY ON ZNOTE.ZBODY = ZNOTEBODY.Z_PK",
                [],
                |row| row.get(0),
            )
            .map_err(AppError::database)?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Fetches the latest edit of every note group.
    ///
    /// Statement errors are fatal; rows that fail to decode come back as
    /// `Err` entries so the caller can report them and move on.
    ///
    /// # Errors
    /// Returns error if the query cannot be prepared or executed.
    pub fn fetch_latest_notes(&self, group_by: GroupPolicy) -> Result<Vec<Result<RawNoteRow>>> {
        let sql = latest_notes_query(group_by);
        let mut stmt = self.conn.prepare(&sql).map_err(AppError::database)?;

        let rows = stmt
            .query_map([], map_row)
            .map_err(AppError::database)?
            .map(|row| row.map_err(AppError::database))
            .collect::<Vec<_>>();

        tracing::debug!(group_by = %group_by, "Fetched {} note rows", rows.len());

        Ok(rows)
    }
}

/// Builds the aggregation query for a grouping policy.
///
/// Title and body are bare columns next to `MAX(ZDATEEDITED)`, so `SQLite`
/// takes them from the row holding the maximum.
fn latest_notes_query(group_by: GroupPolicy) -> String {
    let group_key = match group_by {
        GroupPolicy::CreationSecond => {
            format!("DATETIME(ZNOTE.ZDATECREATED + {STORE_EPOCH_OFFSET}, 'unixepoch')")
        }
        GroupPolicy::Note => "ZNOTE.Z_PK".to_string(),
    };

    format!(
        "SELECT
            ZNOTE.Z_PK,
            ZNOTE.ZTITLE,
            ZNOTEBODY.ZHTMLSTRING,
            MAX(ZNOTE.ZDATEEDITED) AS LASTEDITED
         FROM ZNOTE INNER JOIN ZNOTEBODY ON ZNOTE.ZBODY = ZNOTEBODY.Z_PK
         GROUP BY {group_key}"
    )
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<RawNoteRow> {
    Ok(RawNoteRow {
        id: row.get(0)?,
        title: row.get(1)?,
        html_body: row.get(2)?,
        last_edited: row.get(3)?,
    })
}
