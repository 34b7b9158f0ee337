//! Remote endpoint configuration.

use neuroform_core::error::{NeuroformError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Backend used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Environment variable overriding every other source.
pub const BACKEND_URL_ENV: &str = "NEUROFORM_BACKEND_URL";

/// Connection settings for the remote session/schema store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
        }
    }
}

impl RemoteConfig {
    /// Loads configuration with the usual priority:
    ///
    /// 1. `NEUROFORM_BACKEND_URL` environment variable
    /// 2. `<config_dir>/neuroform/config.toml`
    /// 3. built-in default (`http://localhost:8000`)
    pub fn load() -> Result<Self> {
        if let Ok(url) = env::var(BACKEND_URL_ENV)
            && !url.is_empty()
        {
            tracing::debug!("[RemoteConfig] Using backend URL from {}", BACKEND_URL_ENV);
            return Ok(Self { backend_url: url });
        }

        if let Some(path) = Self::default_config_file()
            && path.exists()
        {
            return Self::from_file(&path);
        }

        Ok(Self::default())
    }

    /// Reads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;

        if config.backend_url.is_empty() {
            return Err(NeuroformError::config(format!(
                "empty backend_url in {:?}",
                path
            )));
        }

        Ok(config)
    }

    /// The per-user config file location, when a config dir exists.
    pub fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("neuroform").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_backend() {
        assert_eq!(RemoteConfig::default().backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = \"http://eeg-lab:9000\"\n").unwrap();

        let config = RemoteConfig::from_file(&path).unwrap();
        assert_eq!(config.backend_url, "http://eeg-lab:9000");
    }

    #[test]
    fn test_from_file_defaults_missing_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let config = RemoteConfig::from_file(&path).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_from_file_rejects_empty_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = \"\"\n").unwrap();

        assert!(RemoteConfig::from_file(&path).is_err());
    }
}
