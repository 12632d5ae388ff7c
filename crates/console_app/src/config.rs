//! Console settings loaded from `console.ron`.
//!
//! Every field is optional in the file; missing ones take their defaults.
//! Command-line flags (and `CONSOLE_BASE_URL`) are applied on top by the
//! caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use console_core::{DEFAULT_PAGE_SIZE, MONITOR_INTERVAL};
use console_engine::ApiSettings;
use console_logging::console_info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "console.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub monitor_interval_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            base_url: api.base_url,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: api.request_timeout.as_secs(),
            connect_timeout_secs: api.connect_timeout.as_secs(),
            monitor_interval_secs: MONITOR_INTERVAL.as_secs(),
        }
    }
}

impl ConsoleConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        console_info!("loaded settings from {:?}", path);
        Ok(config)
    }

    /// Load `path` if given (it must exist), otherwise `console.ron` in the
    /// working directory when present, otherwise defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".into()));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least 1s".into()));
        }
        if self.monitor_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "monitor_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..ApiSettings::default()
        }
    }
}
