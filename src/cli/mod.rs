//! CLI interface using clap.
//!
//! Every flag is optional; without any the tool reads `db/NotesV7.storedata`
//! and writes into `notes/`.

use std::path::PathBuf;

use clap::Parser;

use crate::application::SummaryFormat;
use crate::domain::{AppConfig, CollisionPolicy, GroupPolicy};

/// Notes Export - write every note of a NotesV7 store to an HTML file
/// carrying the note's last edit time.
#[derive(Parser, Debug)]
#[command(name = "notes-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file (defaults to ./notes-export.toml, then the user config dir).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the note store.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Output directory for the exported files.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Grouping: creation-second or note.
    #[arg(long)]
    pub group_by: Option<String>,

    /// What to do with duplicate file names: overwrite, suffix or skip.
    #[arg(long)]
    pub on_collision: Option<String>,

    /// Summary format: text or json.
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Parse the summary format argument.
    pub fn summary_format(&self) -> Result<SummaryFormat, String> {
        self.format.parse()
    }

    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, mut config: AppConfig) -> Result<AppConfig, String> {
        if let Some(db) = &self.db {
            config.export.database.clone_from(db);
        }
        if let Some(out) = &self.out {
            config.export.output_dir.clone_from(out);
        }
        if let Some(group_by) = &self.group_by {
            config.export.group_by = group_by.parse::<GroupPolicy>()?;
        }
        if let Some(on_collision) = &self.on_collision {
            config.export.on_collision = on_collision.parse::<CollisionPolicy>()?;
        }
        Ok(config)
    }
}
