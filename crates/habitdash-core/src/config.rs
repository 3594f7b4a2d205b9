//! Application configuration
//!
//! Loaded from `~/.local/share/habitdash/config.toml` when present, otherwise
//! from the embedded default in `config/habitdash.toml`. Environment
//! variables override individual fields afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::format::Locale;

/// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("../../../config/habitdash.toml");

pub const USER_ID_ENV: &str = "HABITDASH_USER_ID";
pub const BACKEND_URL_ENV: &str = "HABITDASH_BACKEND_URL";
pub const ANON_KEY_ENV: &str = "HABITDASH_ANON_KEY";
pub const ACCESS_TOKEN_ENV: &str = "HABITDASH_ACCESS_TOKEN";

/// Remote backend settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub access_token: Option<String>,
}

impl BackendConfig {
    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        set(&self.url) && set(&self.anon_key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Owner of the records; `None` means a local-only profile
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default = "default_week_start")]
    pub week_start: Weekday,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub widget_dir: Option<PathBuf>,
    #[serde(default)]
    pub backend: BackendConfig,
}

fn default_week_start() -> Weekday {
    Weekday::Mon
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            locale: Locale::default(),
            week_start: default_week_start(),
            currency_symbol: default_currency_symbol(),
            widget_dir: None,
            backend: BackendConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the user override (or the embedded default) and apply env vars
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::from_toml_str(DEFAULT_CONFIG)?,
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config");
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup(USER_ID_ENV).and_then(|v| Uuid::parse_str(v.trim()).ok()) {
            self.user_id = Some(id);
        }
        if let Some(url) = lookup(BACKEND_URL_ENV) {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup(ANON_KEY_ENV) {
            self.backend.anon_key = Some(key);
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV) {
            self.backend.access_token = Some(token);
        }
    }

    /// The configured user, or the nil id used by local-only profiles
    pub fn effective_user_id(&self) -> Uuid {
        self.user_id.unwrap_or_else(Uuid::nil)
    }

    /// Directory the widget snapshot is written to
    pub fn widget_dir(&self) -> Option<PathBuf> {
        self.widget_dir.clone().or_else(data_dir)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// `~/.local/share/habitdash` (platform equivalent elsewhere)
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("habitdash"))
}

/// Location of the user's config override
pub fn default_config_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("config.toml"))
}
