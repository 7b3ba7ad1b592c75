//! Configuration management for talk.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (TALK_*)
//! 2. Config file (~/.ai-talk/config.toml)
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use talk_core::client::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_LOGIN_PATH, DEFAULT_MAX_LENGTH, DEFAULT_TIMEOUT,
};

use crate::error::TalkResult;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Paths
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API (dev server `/api` prefix or backend)
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum accepted response body size in bytes
    #[serde(default = "default_max_length")]
    pub max_content_length: usize,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_length")]
    pub max_body_length: usize,

    /// Give up on a streamed reply after this many silent seconds
    #[serde(default)]
    pub stream_idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Stored credentials (token and cached user)
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,
}

// Default value functions
fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AI_TALK_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ai-talk")
}

fn default_credentials_file() -> PathBuf {
    default_data_dir().join("credentials.json")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            max_content_length: default_max_length(),
            max_body_length: default_max_length(),
            stream_idle_timeout_secs: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> TalkResult<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &std::path::Path) -> TalkResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    /// Apply `TALK_*` overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TALK_API_URL") {
            self.api.url = url;
        }
        if let Some(secs) = lookup("TALK_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()) {
            self.api.timeout_secs = secs;
        }
        if let Some(secs) = lookup("TALK_STREAM_IDLE_SECS").and_then(|s| s.trim().parse().ok()) {
            self.api.stream_idle_timeout_secs = Some(secs);
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> TalkResult<PathBuf> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(config_path)
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("TALK_CONFIG") {
            PathBuf::from(path)
        } else {
            default_data_dir().join("config.toml")
        }
    }

    /// Client settings derived from this configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.url.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            max_content_length: self.api.max_content_length,
            max_body_length: self.api.max_body_length,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            stream_idle_timeout: self.api.stream_idle_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.url, "http://localhost:3000/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.max_content_length, 10_000_000);
        assert_eq!(config.api.max_body_length, 10_000_000);
        assert!(config.api.stream_idle_timeout_secs.is_none());
        assert!(config.paths.credentials_file.ends_with("credentials.json"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[api]\nurl = \"http://backend:8000/api\"\n").unwrap();

        let config = Config::load_from(&path).expect("Failed to load config");

        assert_eq!(config.api.url, "http://backend:8000/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert!(config.paths.credentials_file.ends_with("credentials.json"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp = tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.api.url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[api\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, crate::error::TalkError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TALK_API_URL", "http://127.0.0.1:8000/api"),
            ("TALK_TIMEOUT_SECS", "30"),
            ("TALK_STREAM_IDLE_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.url, "http://127.0.0.1:8000/api");
        assert_eq!(config.api.timeout_secs, 30);
        // Unparseable values are ignored
        assert!(config.api.stream_idle_timeout_secs.is_none());
    }

    #[test]
    fn test_client_config_mapping() {
        let mut config = Config::default();
        config.api.timeout_secs = 3;
        config.api.stream_idle_timeout_secs = Some(45);

        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert_eq!(client.stream_idle_timeout, Some(Duration::from_secs(45)));
        assert_eq!(client.login_path, "/login");
    }

    #[test]
    fn test_roundtrip_toml() {
        let config = Config::default();
        let encoded = toml::to_string_pretty(&config).unwrap();
        let decoded: Config = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded.api.url, config.api.url);
        assert_eq!(decoded.paths.credentials_file, config.paths.credentials_file);
    }
}
