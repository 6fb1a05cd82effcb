//! Application configuration settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::paths::STORAGE_FILE_NAME;
use crate::draft::DEFAULT_STALE_AFTER_DAYS;

/// Typical per-origin local storage limit in browsers.
const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Main configuration for liftlog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftlogConfig {
    /// Storage region settings.
    pub storage: StorageConfig,
    /// Draft behaviour settings.
    pub drafts: DraftConfig,
}

/// Storage region configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the storage file. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Maximum size of the storage region in bytes.
    pub quota_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl StorageConfig {
    /// Storage file location if the directory is overridden.
    #[must_use]
    pub fn file_override(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(STORAGE_FILE_NAME))
    }
}

/// Draft configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// Days without an update before a draft is reported as stale.
    pub stale_after_days: u32,
    /// Log canonicalization and conflict events at `info` level.
    pub diagnostics: bool,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
            diagnostics: false,
        }
    }
}

/// Environment variables that can override configuration.
pub mod env {
    pub const DATA_DIR: &str = "LIFTLOG_DATA_DIR";
    pub const DIAGNOSTICS: &str = "LIFTLOG_DIAGNOSTICS";
    pub const STALE_DAYS: &str = "LIFTLOG_STALE_DAYS";
    pub const LOG_LEVEL: &str = "LIFTLOG_LOG";
    pub const USER: &str = "LIFTLOG_USER";
}

impl LiftlogConfig {
    /// Apply environment variable overrides to the configuration.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(env::DATA_DIR).filter(|d| !d.is_empty()) {
            self.storage.dir = Some(PathBuf::from(dir));
        }

        if let Some(flag) = lookup(env::DIAGNOSTICS) {
            self.drafts.diagnostics = matches!(
                flag.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Some(days) = lookup(env::STALE_DAYS) {
            if let Ok(parsed) = days.trim().parse() {
                self.drafts.stale_after_days = parsed;
            }
        }

        self
    }
}
