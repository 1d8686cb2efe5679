// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User configuration.
//!
//! Configuration lives in `config.toml` under the user's config directory
//! (or wherever `CAPQ_CONFIG` points) and includes:
//! - `[remote]`: base URL of the capture API and network timeouts
//! - `[sync]`: retry bound and debounce window
//! - `[storage]`: state directory override and backend selection
//!
//! A missing file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use capq_core::{BackendMode, ServiceOptions, MAX_RETRY_COUNT};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::env;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "capq";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote capture API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Base URL; collection paths (`notes`, `voice`, ...) are joined onto it.
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How often `watch` probes connectivity, in seconds (default: 5).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

/// Sync policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Failed attempts after which a capture stops retrying automatically.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Debounce window for automatic syncs, in milliseconds (default: 1000).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_retries: default_max_retries(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Local persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// State directory override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub backend: BackendMode,
}

fn default_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_probe_interval_secs() -> u64 {
    5
}

fn default_max_retries() -> u32 {
    MAX_RETRY_COUNT
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Config {
    /// Loads configuration from `path`, or the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Loads configuration from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the rest of the program cannot work with.
    pub fn validate(&self) -> Result<()> {
        let url = self.remote_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "remote url '{}' must use http or https",
                self.remote.url
            )));
        }
        if self.remote.timeout_secs == 0 {
            return Err(Error::Config("remote.timeout_secs must be positive".into()));
        }
        if self.remote.probe_interval_secs == 0 {
            return Err(Error::Config(
                "remote.probe_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Parsed remote base URL, always ending in `/`.
    pub fn remote_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.remote.url).map_err(|e| {
            Error::Config(format!("invalid remote url '{}': {}", self.remote.url, e))
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.remote.probe_interval_secs)
    }

    /// Directory holding the capture database and fallback file.
    pub fn state_dir(&self) -> Result<PathBuf> {
        resolve_state_dir(
            self.storage.dir.clone(),
            env::state_dir(),
            env::xdg_state_home(),
            dirs::home_dir(),
        )
        .ok_or(Error::NoStateDir)
    }

    pub fn service_options(&self, online: bool) -> ServiceOptions {
        ServiceOptions {
            max_retries: self.sync.max_retries,
            debounce: Duration::from_millis(self.sync.debounce_ms),
            online,
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }
}

/// `$CAPQ_CONFIG`, else `<config_dir>/capq/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    env::config_path().or_else(|| {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    })
}

/// First of: explicit override, `$CAPQ_STATE_DIR`, `$XDG_STATE_HOME/capq`,
/// `~/.local/state/capq`.
pub fn resolve_state_dir(
    explicit: Option<PathBuf>,
    env_state_dir: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    explicit
        .or(env_state_dir)
        .or_else(|| xdg_state_home.map(|p| p.join(APP_DIR_NAME)))
        .or_else(|| home.map(|h| h.join(".local").join("state").join(APP_DIR_NAME)))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
