//! Infrastructure layer - external adapters (database, filesystem, config files).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod note_writer;
pub mod notes_reader;

pub use config::{load_config, render_config};
pub use note_writer::{ensure_output_dir, write_note};
pub use notes_reader::{NoteStoreReader, RawNoteRow};
