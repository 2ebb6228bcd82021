//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which names the
//! auth backend, where the session credential is kept, and the last email
//! used to log in.
//!
//! Configuration is stored at `~/.config/gatehouse/config.json`. The backend
//! URL can also come from `GATEHOUSE_BACKEND_URL` (a `.env` file works too).

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};
use crate::session::{SessionManager, SessionOptions};

/// Application name used for config/data directory paths
const APP_NAME: &str = "gatehouse";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const BACKEND_URL_ENV: &str = "GATEHOUSE_BACKEND_URL";
pub const TOKEN_STORE_ENV: &str = "GATEHOUSE_TOKEN_STORE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    #[default]
    File,
    Keyring,
    Memory,
}

impl FromStr for TokenStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(TokenStoreKind::File),
            "keyring" | "keychain" => Ok(TokenStoreKind::Keyring),
            "memory" => Ok(TokenStoreKind::Memory),
            other => Err(anyhow::anyhow!("Unknown token store: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: Option<String>,
    pub token_store: TokenStoreKind,
    pub clear_token_on_logout: bool,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            token_store: TokenStoreKind::default(),
            clear_token_on_logout: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Record the email of the last login. Only that field is written: the
    /// rest of the file stays as it was, whatever env or flag overrides the
    /// running process applied.
    pub fn remember_last_email(email: &str) -> Result<()> {
        Self::remember_last_email_at(&Self::config_path()?, email)
    }

    pub fn remember_last_email_at(path: &Path, email: &str) -> Result<()> {
        let mut stored = Self::load_from(path)?;
        stored.last_email = Some(email.to_string());
        stored.save_to(path)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the file-backed credential
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Overlay values from the environment on top of the file config
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.backend_url = Some(url);
        }
        if let Some(kind) = lookup(TOKEN_STORE_ENV).filter(|k| !k.trim().is_empty()) {
            self.token_store = kind
                .parse()
                .with_context(|| format!("Invalid {}", TOKEN_STORE_ENV))?;
        }
        Ok(())
    }

    pub fn backend_url(&self) -> Result<&str> {
        self.backend_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("Backend URL not configured (set {} or backend_url in config)", BACKEND_URL_ENV)
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            clear_token_on_logout: self.clear_token_on_logout,
        }
    }

    pub fn open_store(&self) -> Result<Arc<dyn TokenStore>> {
        let store: Arc<dyn TokenStore> = match self.token_store {
            TokenStoreKind::File => Arc::new(FileTokenStore::new(self.data_dir()?)),
            TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new()),
            TokenStoreKind::Memory => Arc::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }

    /// Build the session manager this configuration describes
    pub fn build_session(&self) -> Result<SessionManager> {
        let api = ApiClient::new(self.backend_url()?, self.request_timeout())
            .context("Failed to create API client")?;
        Ok(SessionManager::new(api, self.open_store()?, self.session_options()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.token_store, TokenStoreKind::File);
        assert!(config.clear_token_on_logout);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.backend_url().is_err());
    }

    #[test]
    fn test_remember_last_email_keeps_file_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let on_disk = Config {
            backend_url: Some("https://api.example.com".to_string()),
            token_store: TokenStoreKind::Keyring,
            ..Config::default()
        };
        on_disk.save_to(&path).unwrap();

        // What the process runs with after env and flag overrides
        let mut running = Config::load_from(&path).unwrap();
        running
            .apply_env_from(|key| match key {
                "GATEHOUSE_TOKEN_STORE" => Some("memory".to_string()),
                "GATEHOUSE_BACKEND_URL" => Some("http://localhost:9999".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(running.token_store, TokenStoreKind::Memory);

        Config::remember_last_email_at(&path, "j@example.com").unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.last_email.as_deref(), Some("j@example.com"));
        assert_eq!(reloaded.token_store, TokenStoreKind::Keyring);
        assert_eq!(reloaded.backend_url.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn test_remember_last_email_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gatehouse").join("config.json");

        Config::remember_last_email_at(&path, "j@example.com").unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.last_email.as_deref(), Some("j@example.com"));
        assert_eq!(reloaded.token_store, TokenStoreKind::File);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.backend_url.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gatehouse").join("config.json");

        let config = Config {
            backend_url: Some("https://api.example.com".to_string()),
            token_store: TokenStoreKind::Keyring,
            clear_token_on_logout: false,
            request_timeout_secs: 5,
            last_email: Some("j@example.com".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.backend_url().unwrap(), "https://api.example.com");
        assert_eq!(loaded.token_store, TokenStoreKind::Keyring);
        assert!(!loaded.clear_token_on_logout);
        assert_eq!(loaded.last_email.as_deref(), Some("j@example.com"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"backend_url": "http://localhost:3000"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url().unwrap(), "http://localhost:3000");
        assert!(config.clear_token_on_logout);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            backend_url: Some("http://from-file".to_string()),
            ..Default::default()
        };
        config
            .apply_env_from(|key| match key {
                BACKEND_URL_ENV => Some("http://from-env".to_string()),
                TOKEN_STORE_ENV => Some("memory".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.backend_url().unwrap(), "http://from-env");
        assert_eq!(config.token_store, TokenStoreKind::Memory);
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config {
            backend_url: Some("http://from-file".to_string()),
            ..Default::default()
        };
        config.apply_env_from(|_| Some("  ".to_string())).unwrap();
        assert_eq!(config.backend_url().unwrap(), "http://from-file");
        assert_eq!(config.token_store, TokenStoreKind::File);
    }

    #[test]
    fn test_invalid_store_kind() {
        let mut config = Config::default();
        let result = config.apply_env_from(|key| (key == TOKEN_STORE_ENV).then(|| "floppy".to_string()));
        assert!(result.is_err());
        assert!("keychain".parse::<TokenStoreKind>().is_ok());
    }

    #[test]
    fn test_build_session_requires_backend() {
        let config = Config {
            token_store: TokenStoreKind::Memory,
            ..Default::default()
        };
        assert!(config.build_session().is_err());

        let config = Config {
            backend_url: Some("http://localhost:3000/".to_string()),
            token_store: TokenStoreKind::Memory,
            ..Default::default()
        };
        let session = config.build_session().unwrap();
        assert!(session.is_loading());
    }
}
