//! Application settings

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{LanguagePolicy, RelationFilter};

/// Environment variable holding the backend bearer token
pub const TOKEN_ENV: &str = "PECHA_ADMIN_TOKEN";

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL
    pub api_base_url: String,

    /// Publishing site sent with category assignments
    pub site: String,

    /// Bearer token for the backend, if it requires one
    pub api_token: Option<String>,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// Pechas fetched per page
    pub page_size: u32,

    /// Preferred display languages, most preferred first
    pub languages: LanguagePolicy,

    /// Which pechas the pecha list offers
    pub relation_filter: RelationFilter,

    /// Log level (overridden by RUST_LOG)
    pub log_level: String,

    /// Log file path; the terminal belongs to the UI
    pub log_file: Option<String>,

    /// Theme name
    pub theme: String,

    /// Seconds a notification stays on screen
    pub toast_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            site: "https://pecha.org".to_string(),
            api_token: None,
            request_timeout_secs: 30,
            page_size: 50,
            languages: LanguagePolicy::default(),
            relation_filter: RelationFilter::All,
            log_level: "info".to_string(),
            log_file: None,
            theme: "default".to_string(),
            toast_secs: 4,
        }
    }
}

impl Settings {
    /// Load settings from file or create default
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?
        } else {
            Self::default()
        };

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                settings.api_token = Some(token);
            }
        }

        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        // Create parent directory if needed
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Write a default config file unless one exists. Returns the path and
    /// whether it was written.
    pub fn init_file(path: Option<&str>) -> Result<(PathBuf, bool)> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);
        if config_path.exists() {
            return Ok((config_path, false));
        }
        Self::default()
            .save(config_path.to_str())
            .with_context(|| format!("writing {}", config_path.display()))?;
        Ok((config_path, true))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::config_dir().join("pecha-admin.log"))
    }

    /// Get default config directory
    pub fn config_dir() -> PathBuf {
        ProjectDirs::from("org", "openpecha", "pecha-admin")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".config")
                    .join("pecha-admin")
            })
    }

    /// Get default config file path
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }
}
