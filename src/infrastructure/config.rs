//! Configuration file management.
//!
//! Handles locating, loading and rendering TOML configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Load configuration from an explicit file, or from the first file found
/// in the lookup order, or fall back to defaults.
///
/// Lookup order: `./notes-export.toml`, then the per-user config file.
///
/// # Errors
/// Returns error if the explicit file is missing, or a found file cannot be
/// read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(AppError::Config {
                message: format!("Config file not found: {}", path.display()),
            });
        }
        return load_config_from_file(path);
    }

    match find_config_file() {
        Some(path) => load_config_from_file(&path),
        None => {
            tracing::debug!("No config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Returns the first existing config file in the lookup order.
fn find_config_file() -> Option<PathBuf> {
    std::iter::once(PathBuf::from(AppConfig::LOCAL_FILE_NAME))
        .chain(AppConfig::user_config_path())
        .find(|p| p.is_file())
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    let config = toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file {}: {e}", path.display()),
    })?;

    tracing::info!(path = %path.display(), "Loaded configuration");

    Ok(config)
}

/// Render a configuration as TOML.
///
/// # Errors
/// Returns error if serialization fails.
pub fn render_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| AppError::Config {
        message: format!("Failed to serialize config: {e}"),
    })
}
