//! Client configuration.
//!
//! `AppConfig` is read from `starnote/config.json` under the platform config
//! directory, then environment overrides are applied on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::HttpTimeouts;
use crate::error::{Error, Result};
use crate::util::{is_http_url, non_blank};

const CONFIG_DIR_NAME: &str = "starnote";
const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_API_URL: &str = "STARNOTE_API_URL";
pub const ENV_DATA_DIR: &str = "STARNOTE_DATA_DIR";

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Sync server base URL; sync and remote accounts are off without it
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Where preference files live
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            data_dir: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(CONFIG_DIR_NAME))
}

impl AppConfig {
    /// Load the config file (if any) and apply process environment overrides
    pub fn resolve(explicit_path: Option<&Path>) -> Result<Self> {
        let config = match explicit_path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };
        config
            .with_env_overrides(|key| std::env::var(key).ok())
            .validated()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::Config(format!(
                "Failed to parse config at {}: {}",
                path.display(),
                error
            ))
        })?;
        Ok(config.normalized())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(&self.clone().normalized())?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Apply `STARNOTE_API_URL` / `STARNOTE_DATA_DIR` from `lookup`
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = non_blank(lookup(ENV_API_URL)) {
            self.api_base_url = Some(url);
        }
        if let Some(dir) = non_blank(lookup(ENV_DATA_DIR)) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self.normalized()
    }

    #[must_use]
    fn normalized(mut self) -> Self {
        self.api_base_url = non_blank(self.api_base_url)
            .map(|url| url.trim_end_matches('/').to_string());
        self
    }

    fn validated(self) -> Result<Self> {
        if let Some(url) = self.api_base_url.as_deref() {
            if !is_http_url(url) {
                return Err(Error::Config(format!(
                    "api_base_url '{url}' must include http:// or https://"
                )));
            }
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(Error::Config("timeouts must be at least one second".into()));
        }
        Ok(self)
    }

    /// Configured data directory, else the platform default
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.data_dir
            .clone()
            .or_else(default_data_dir)
            .ok_or_else(|| Error::Config("Could not determine a data directory".into()))
    }

    pub const fn http_timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            request: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
