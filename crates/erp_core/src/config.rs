//! Runtime configuration for storage, REST collaborator, toasts and logging.
//!
//! # Responsibility
//! - Provide defaults matching the ERP front-end (`http://localhost:5000/api`,
//!   4000 ms toasts, in-memory storage).
//! - Load overrides from a JSON file and `ERP_*` environment variables.
//!
//! # Invariants
//! - A config returned by `from_json_file`/`load` has passed `validate`.

use crate::logging::normalize_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TOAST_DURATION_MS: i64 = 4_000;

const ENV_API_BASE_URL: &str = "ERP_API_BASE_URL";
const ENV_DB_PATH: &str = "ERP_DB_PATH";
const ENV_LOG_LEVEL: &str = "ERP_LOG_LEVEL";
const ENV_LOG_DIR: &str = "ERP_LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        message: String,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "failed to parse config `{}`: {message}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { .. } | Self::Invalid(_) => None,
        }
    }
}

/// Where local collections are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    #[default]
    Memory,
    Sqlite {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout_ms: 2_000,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// `<= 0` makes toasts sticky by default.
    pub default_duration_ms: i64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_TOAST_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErpConfig {
    pub storage: StorageConfig,
    pub api: ApiConfig,
    pub toast: ToastConfig,
    pub logging: LoggingConfig,
}

impl ErpConfig {
    /// Reads a JSON config file. Missing sections take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults or file config, then process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `ERP_*` overrides from `lookup` (normally the environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = lookup(ENV_API_BASE_URL) {
            self.api.base_url = base_url.trim().to_string();
        }
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.storage = StorageConfig::Sqlite {
                path: PathBuf::from(path.trim()),
            };
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            self.logging.log_dir = Some(PathBuf::from(dir.trim()));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.as_str();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must start with http:// or https://, got `{base_url}`"
            )));
        }
        if self.api.connect_timeout_ms == 0 || self.api.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "api timeouts must be greater than zero".to_string(),
            ));
        }
        normalize_level(&self.logging.level).map_err(ConfigError::Invalid)?;
        if let Some(dir) = &self.logging.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "logging.log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
