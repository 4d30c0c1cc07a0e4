use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::ErrorKind;
use crate::error_log::{DEFAULT_CAPACITY, DEFAULT_RECENT, DEFAULT_STORAGE_KEY};
use crate::retry::DEFAULT_NON_RETRYABLE_CODES;

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry, in milliseconds; doubles for each further retry.
    pub base_delay_ms: u64,
    /// Upper bound on a single wait, in seconds.
    pub max_delay_secs: u64,
    /// Graph API codes that are returned immediately.
    pub non_retryable_codes: Vec<i64>,
    /// Error kinds that are returned immediately.
    pub non_retryable_kinds: Vec<ErrorKind>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_secs: 60,
            non_retryable_codes: DEFAULT_NON_RETRYABLE_CODES.to_vec(),
            non_retryable_kinds: vec![ErrorKind::TokenExpired],
        }
    }
}

/// Error log parameters (optional `[error_log]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorLogConfig {
    /// Entries kept before the oldest is evicted.
    pub capacity: usize,
    /// Entries reported as "recent" by `stats`.
    pub recent: usize,
    /// Storage key holding the JSON array.
    pub storage_key: String,
}

impl Default for ErrorLogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            recent: DEFAULT_RECENT,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/adsdash/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdsdashConfig {
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional error log settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub error_log: Option<ErrorLogConfig>,
    /// User agent stamped on log entries (default `adsdash/<version>`).
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl AdsdashConfig {
    pub fn retry_or_default(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn error_log_or_default(&self) -> ErrorLogConfig {
        self.error_log.clone().unwrap_or_default()
    }

    pub fn user_agent_or_default(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("adsdash/{}", env!("CARGO_PKG_VERSION")))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("adsdash")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AdsdashConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<AdsdashConfig> {
    if !path.exists() {
        let default_cfg = AdsdashConfig {
            retry: Some(RetryConfig::default()),
            error_log: Some(ErrorLogConfig::default()),
            user_agent: None,
        };
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AdsdashConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
