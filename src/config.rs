//! Configuration for coursetrack

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ProgressError;

/// Default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coursetrack")
}

/// Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for the progress database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Database file name within the data directory
    #[serde(default = "default_db_file")]
    pub db_file: String,

    /// Whether finishing every section triggers certificate issuance
    #[serde(default = "default_true")]
    pub issue_certificates: bool,

    /// Event bus channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_db_file() -> String {
    "progress.db".to_string()
}

fn default_true() -> bool {
    true
}

fn default_event_capacity() -> usize {
    1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_file: default_db_file(),
            issue_certificates: true,
            event_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    /// Full path to the database file
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    /// Load configuration from a TOML file, falling back to defaults if absent
    pub fn load_or_default(path: &Path) -> Result<Self, ProgressError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| ProgressError::Config(format!("Invalid config: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ProgressError> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| ProgressError::Config(format!("Serialize failed: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.db_file, "progress.db");
        assert!(config.issue_certificates);
        assert_eq!(config.event_capacity, 1024);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.issue_certificates = false;
        config.save(&path).unwrap();

        let loaded = Config::load_or_default(&path).unwrap();
        assert!(!loaded.issue_certificates);
    }

    #[test]
    fn test_missing_file_is_default() {
        let loaded = Config::load_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(loaded.db_file, "progress.db");
    }
}
