//! Writes exported notes to disk.
//!
//! Each file is created (or truncated), filled with the note body and
//! stamped with the note's edit time. The handle lives only inside
//! [`write_note`] and is closed when it returns, on success or error.

use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use crate::domain::{AppError, Result};

/// Creates the output directory if needed. An existing directory is left untouched.
///
/// # Errors
/// Returns error if the directory cannot be created.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create directory {}", dir.display()), e))
}

/// Writes `body` to `path` and sets both access and modification time to `modified`.
///
/// # Errors
/// Returns error if the file cannot be opened, written or timestamped.
pub fn write_note(path: &Path, body: &str, modified: SystemTime) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to open {}", path.display()), e))?;

    file.write_all(body.as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

    let times = FileTimes::new().set_accessed(modified).set_modified(modified);
    file.set_times(times)
        .map_err(|e| AppError::io(format!("Failed to set times on {}", path.display()), e))?;

    Ok(())
}
