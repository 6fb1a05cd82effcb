//! Platform-specific path utilities for liftlog.

use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Name of the file holding the draft storage region.
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Get the configuration directory for liftlog.
///
/// - Linux: `~/.config/liftlog`
/// - macOS: `~/Library/Application Support/liftlog`
/// - Windows: `%APPDATA%\liftlog`
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| AppError::Config("Cannot determine config directory".to_string()))?;
    Ok(base.join("liftlog"))
}

/// Get the data directory for liftlog.
///
/// - Linux: `~/.local/share/liftlog`
/// - macOS: `~/Library/Application Support/liftlog`
/// - Windows: `%APPDATA%\liftlog`
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| AppError::Config("Cannot determine data directory".to_string()))?;
    Ok(base.join("liftlog"))
}

/// Get the main configuration file path.
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the storage region file in the default data directory.
pub fn storage_file() -> Result<PathBuf> {
    Ok(data_dir()?.join(STORAGE_FILE_NAME))
}
