//! Configuration management for myaii.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (MYAII_HEYGEN_*)
//! 2. Config file (`config.toml` in the data directory, or `MYAII_CONFIG`)
//! 3. Default values

use anyhow::{Context, Result};
use directories::ProjectDirs;
use myaii_core::config::StreamingConfig;
use myaii_core::storage::FileStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Streaming avatar provider settings
    #[serde(default)]
    pub streaming: StreamingConfig,

    /// Paths
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for myaii data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("app", "myaii", "myaii") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".myaii")
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.streaming.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("MYAII_CONFIG") {
            PathBuf::from(path)
        } else {
            default_data_dir().join("config.toml")
        }
    }

    /// Location of the local key-value store.
    pub fn store_path(&self) -> PathBuf {
        self.paths.data_dir.join("store.json")
    }

    /// Open the local key-value store.
    pub fn open_store(&self) -> Result<Arc<FileStore>> {
        let path = self.store_path();
        let store = FileStore::open(&path)
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use myaii_core::streaming::Quality;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&temp.path().join("config.toml")).unwrap();

        assert_eq!(config.streaming.api_base_url, "https://api.heygen.com");
        assert!(!config.streaming.is_configured());
        assert_eq!(config.streaming.retry.max_attempts, 3);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[streaming]
api_key = "k"
quality = "medium"

[paths]
data_dir = "/tmp/myaii-test"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.streaming.api_key(), Some("k"));
        assert_eq!(config.streaming.quality, Quality::Medium);
        assert_eq!(config.streaming.api_base_url, "https://api.heygen.com");
        assert_eq!(config.store_path(), PathBuf::from("/tmp/myaii-test/store.json"));
    }

    #[test]
    fn test_save_and_reload() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.streaming.default_avatar_id = "Anna_public".to_string();
        config.paths.data_dir = temp.path().to_path_buf();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.streaming.default_avatar_id, "Anna_public");
        assert_eq!(loaded.paths.data_dir, temp.path());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "streaming = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_open_store_in_data_dir() {
        let temp = tempdir().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.paths.data_dir = temp.path().join("data");

        let store = config.open_store().unwrap();
        assert_eq!(store.path(), config.store_path());
    }
}
