//! Settings file management for forumscope.
//!
//! Reads `~/.config/forumscope/config.toml`:
//!
//! ```toml
//! [client]
//! base_url = "https://discuss.streamlit.io"
//! timeout_secs = 5
//!
//! [search]
//! top = 3
//! criteria = "narrow"
//! sortby = "likes"
//! status = "solved"
//! ```
//!
//! A missing or empty file yields the defaults.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use forumscope_core::error::ConfigError;
use forumscope_core::search::{SearchConfig, SearchOptions};

use crate::paths::{ForumscopePaths, PathError};

pub const DEFAULT_BASE_URL: &str = "https://discuss.streamlit.io";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Environment variable overriding `client.base_url`.
pub const BASE_URL_ENV: &str = "FORUMSCOPE_BASE_URL";

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting '{key}': {message}")]
    Invalid { key: &'static str, message: String },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// HTTP client settings for the forum backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    /// Bound on a whole search request
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("forumscope/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// `[client]` section as written in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ClientSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
}

/// Root structure of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigRoot {
    client: ClientSection,
    search: SearchOptions,
}

/// Loaded settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub client: ClientSettings,
    /// Unvalidated search options; see [`Settings::search_config`]
    pub search: SearchOptions,
}

impl Settings {
    /// Validates the search options.
    pub fn search_config(&self) -> Result<SearchConfig, ConfigError> {
        self.search.validate()
    }

    /// Applies an override for the base URL, typically read from [`BASE_URL_ENV`].
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Result<Self, SettingsError> {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.client.base_url = validate_base_url(url.trim())?;
        }
        Ok(self)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, SettingsError> {
        self.with_base_url_override(std::env::var(BASE_URL_ENV).ok())
    }

    fn from_root(root: ConfigRoot) -> Result<Self, SettingsError> {
        let defaults = ClientSettings::default();

        let base_url = match root.client.base_url {
            Some(url) => validate_base_url(url.trim())?,
            None => defaults.base_url,
        };

        let timeout = match root.client.timeout_secs {
            Some(0) => {
                return Err(SettingsError::Invalid {
                    key: "client.timeout_secs",
                    message: "must be greater than zero".to_string(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        Ok(Self {
            client: ClientSettings {
                base_url,
                timeout,
                user_agent: root.client.user_agent.unwrap_or(defaults.user_agent),
            },
            search: root.search,
        })
    }
}

fn validate_base_url(url: &str) -> Result<String, SettingsError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(SettingsError::Invalid {
            key: "client.base_url",
            message: format!("'{url}' is not an http(s) URL"),
        })
    }
}

/// Handle on a settings file.
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// Uses the default location, `~/.config/forumscope/config.toml`.
    pub fn new() -> Result<Self, SettingsError> {
        Ok(Self {
            path: ForumscopePaths::config_file()?,
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the settings file. Missing or empty files yield defaults.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "Settings file not found, using defaults");
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        let root: ConfigRoot = toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })?;

        Settings::from_root(root)
    }
}
