//! # Configuration
//!
//! Jotter configuration is loaded with [`confique`], layered in priority order:
//! 1. **Environment variables**: `JOTTER_DEBOUNCE_MS`, `JOTTER_DATA_DIR`, etc.
//! 2. **Config file**: `jotter.toml` in the OS config directory (via `directories`).
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `debounce_ms` | `500` | Quiet period after the last edit before saving |
//! | `block_settle_ms` | `150` | Wait after a block insert/delete before the follow-up save |
//! | `delete_grace_ms` | `300` | Wait before a document is moved to the trash |
//! | `data_dir` | OS data dir | Where the file store keeps its data |

use crate::error::{JotterError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "jotter.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JotterConfig {
    /// Trailing-edge debounce for saves, in milliseconds.
    #[config(env = "JOTTER_DEBOUNCE_MS", default = 500)]
    pub debounce_ms: u64,

    /// Delay between a block insert/delete and the save it schedules, so the
    /// block subscription has caught up before the save re-reads the blocks.
    #[config(env = "JOTTER_BLOCK_SETTLE_MS", default = 150)]
    pub block_settle_ms: u64,

    /// Grace period before a delete request moves the document to the trash.
    #[config(env = "JOTTER_DELETE_GRACE_MS", default = 300)]
    pub delete_grace_ms: u64,

    /// Root directory of the file store. Falls back to the OS data directory.
    #[config(env = "JOTTER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl Default for JotterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            block_settle_ms: 150,
            delete_grace_ms: 300,
            data_dir: None,
        }
    }
}

/// The three delays an editor session runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub debounce: Duration,
    pub block_settle: Duration,
    pub delete_grace: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        JotterConfig::default().timings()
    }
}

impl JotterConfig {
    /// Loads configuration from the environment and, if present, `config_file`.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = JotterConfig::builder().env();
        if let Some(path) = config_file {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| JotterError::Config(e.to_string()))
    }

    /// Loads configuration using the default config file location.
    pub fn load() -> Result<Self> {
        let path = default_config_file();
        Self::load_from(path.as_deref())
    }

    pub fn timings(&self) -> SessionTimings {
        SessionTimings {
            debounce: Duration::from_millis(self.debounce_ms),
            block_settle: Duration::from_millis(self.block_settle_ms),
            delete_grace: Duration::from_millis(self.delete_grace_ms),
        }
    }

    /// The configured data directory, or the OS default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| JotterError::Config("Could not determine a data directory".to_string()))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "jotter")
}

pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = JotterConfig::default();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.block_settle_ms, 150);
        assert_eq!(config.delete_grace_ms, 300);
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_timings_from_config() {
        let config = JotterConfig {
            debounce_ms: 250,
            ..Default::default()
        };
        let timings = config.timings();
        assert_eq!(timings.debounce, Duration::from_millis(250));
        assert_eq!(timings.block_settle, Duration::from_millis(150));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = JotterConfig {
            data_dir: Some(PathBuf::from("/tmp/jotter-data")),
            ..Default::default()
        };
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/jotter-data"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "debounce_ms = 900\ndelete_grace_ms = 10\n").unwrap();

        let config = JotterConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.debounce_ms, 900);
        assert_eq!(config.delete_grace_ms, 10);
        assert_eq!(config.block_settle_ms, 150);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let config = JotterConfig::load_from(Some(&missing)).unwrap();
        assert_eq!(config.block_settle_ms, 150);
    }
}
