use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ClientConfig;

/// Base URL used when nothing else is configured
pub const DEFAULT_SERVER: &str = "http://localhost:8000/api/v1";
/// Environment override for the base URL (also read from `.env`)
pub const SERVER_ENV: &str = "ADFORGE_API_URL";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub server: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "adforge", "adforge")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = project_dirs()?;

        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;

        Ok(config_dir.join("config.toml"))
    }

    /// Location of the persisted session (token + identity snapshot)
    pub fn session_path() -> Result<PathBuf> {
        let proj_dirs = project_dirs()?;
        Ok(proj_dirs.data_dir().join("session.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the client settings: command line, then environment, then file, then defaults
    pub fn client_config(&self, server: Option<String>, timeout_secs: Option<u64>) -> ClientConfig {
        let env_server = std::env::var(SERVER_ENV).ok();
        self.resolve(server, env_server, timeout_secs)
    }

    fn resolve(
        &self,
        cli_server: Option<String>,
        env_server: Option<String>,
        cli_timeout: Option<u64>,
    ) -> ClientConfig {
        let usable = |s: &String| !s.trim().is_empty();
        let base_url = cli_server
            .filter(usable)
            .or_else(|| env_server.filter(usable))
            .or_else(|| self.remote.server.clone().filter(usable))
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        let secs = cli_timeout
            .or(self.remote.timeout_secs)
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        ClientConfig {
            base_url,
            timeout: Duration::from_secs(secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let client = config.resolve(None, None, None);
        assert_eq!(client.base_url, DEFAULT_SERVER);
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_precedence() {
        let config = Config {
            remote: RemoteConfig {
                server: Some("http://file:8000/api/v1".to_string()),
                timeout_secs: Some(10),
            },
        };
        let client = config.resolve(None, Some("http://env/api/v1".to_string()), None);
        assert_eq!(client.base_url, "http://env/api/v1");
        assert_eq!(client.timeout, Duration::from_secs(10));

        let client = config.resolve(
            Some("http://cli/api/v1".to_string()),
            Some("http://env/api/v1".to_string()),
            Some(5),
        );
        assert_eq!(client.base_url, "http://cli/api/v1");
        assert_eq!(client.timeout, Duration::from_secs(5));

        let client = config.resolve(None, None, Some(0));
        assert_eq!(client.base_url, "http://file:8000/api/v1");
        assert_eq!(client.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_blank_values_fall_through() {
        let config = Config {
            remote: RemoteConfig {
                server: Some("http://file:8000/api/v1".to_string()),
                timeout_secs: None,
            },
        };
        let client = config.resolve(Some("".to_string()), Some("http://env/api/v1".to_string()), None);
        assert_eq!(client.base_url, "http://env/api/v1");

        let client = config.resolve(Some(" ".to_string()), Some("".to_string()), None);
        assert_eq!(client.base_url, "http://file:8000/api/v1");
    }

    #[test]
    fn test_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(Config::load_from(&path).unwrap().remote.server.is_none());

        let mut config = Config::default();
        config.remote.server = Some("https://api.adforge.app/api/v1".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.remote.server.as_deref(), Some("https://api.adforge.app/api/v1"));
        assert_eq!(loaded.remote.timeout_secs, None);
    }
}
