//! Export configuration and policies.
//!
//! Defaults reproduce the plain behaviour: read `db/NotesV7.storedata`,
//! write into `notes/`, group by creation second, overwrite on name clashes.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How query rows are grouped into exported notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupPolicy {
    /// One note per distinct creation second; notes created in the same
    /// second collapse into the most recently edited one.
    #[default]
    CreationSecond,
    /// One note per note row.
    Note,
}

impl FromStr for GroupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creation-second" | "created" => Ok(Self::CreationSecond),
            "note" => Ok(Self::Note),
            _ => Err(format!(
                "Unknown grouping: {s}. Use: creation-second, note"
            )),
        }
    }
}

impl fmt::Display for GroupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreationSecond => write!(f, "creation-second"),
            Self::Note => write!(f, "note"),
        }
    }
}

/// What to do when two notes map to the same file name in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Later note replaces the earlier file.
    #[default]
    Overwrite,
    /// Later note is written as `<name>-<id>.html`.
    Suffix,
    /// Later note is not written and reported as a failure.
    Skip,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "suffix" => Ok(Self::Suffix),
            "skip" => Ok(Self::Skip),
            _ => Err(format!(
                "Unknown collision policy: {s}. Use: overwrite, suffix, skip"
            )),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Suffix => write!(f, "suffix"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Settings for a single export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Path to the note store.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Directory receiving the exported files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Row grouping policy.
    #[serde(default)]
    pub group_by: GroupPolicy,

    /// File name collision policy.
    #[serde(default)]
    pub on_collision: CollisionPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            output_dir: default_output_dir(),
            group_by: GroupPolicy::default(),
            on_collision: CollisionPolicy::default(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("db").join("NotesV7.storedata")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("notes")
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    /// Name of the config file looked up in the working directory.
    pub const LOCAL_FILE_NAME: &'static str = "notes-export.toml";

    /// Per-user config file location, if the platform has a config directory.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("notes-export").join("config.toml"))
    }
}
