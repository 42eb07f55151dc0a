use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{Result, TriageError};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_file")]
    pub file: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    8
}

fn default_max_attempts() -> u32 {
    4
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".inbox-triage/session.json")
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TriageError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| TriageError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TriageError::Config(format!("Failed to create directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TriageError::Config(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| TriageError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.server.timeout_secs == 0 {
            return Err(TriageError::Config(
                "server.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.scan.max_concurrent_requests == 0 {
            return Err(TriageError::Config(
                "scan.max_concurrent_requests must be greater than zero".to_string(),
            ));
        }
        if self.scan.max_attempts == 0 {
            return Err(TriageError::Config(
                "scan.max_attempts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed backend root. Guarantees a trailing slash so endpoint
    /// joins never clobber a path segment.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.server.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw)
            .map_err(|e| TriageError::Config(format!("Invalid server.base_url: {}", e)))
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.server.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.max_attempts, 4);
        assert_eq!(config.session.file, PathBuf::from(".inbox-triage/session.json"));
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let config = Config {
            server: ServerConfig {
                base_url: "http://api.example.com/triage".to_string(),
                timeout_secs: 10,
            },
            ..Default::default()
        };

        let url = config.base_url().unwrap();
        assert_eq!(url.as_str(), "http://api.example.com/triage/");
        assert_eq!(url.join("predict").unwrap().path(), "/triage/predict");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = Config {
            server: ServerConfig {
                base_url: "not a url".to_string(),
                timeout_secs: 10,
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TriageError::Config(_))));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            base_url = "http://10.0.0.5:3000/"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "http://10.0.0.5:3000/");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.scan.max_concurrent_requests, 8);
    }

    #[tokio::test]
    async fn test_load_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.server.base_url = "http://backend.test/".to_string();
        config.save(&path).await.unwrap();

        let loaded = Config::load(&path).await.unwrap();
        assert_eq!(loaded.server.base_url, "http://backend.test/");
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(config.server.timeout_secs, 30);
    }
}
