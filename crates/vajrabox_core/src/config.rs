//! Process configuration read from `VAJRABOX_*` environment variables.

use crate::auth::token::{TokenSettings, DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL};
use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "VAJRABOX_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "VAJRABOX_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "VAJRABOX_LOG_DIR";
pub const ENV_TOKEN_SECRET: &str = "VAJRABOX_TOKEN_SECRET";
pub const ENV_ACCESS_TTL_SECS: &str = "VAJRABOX_ACCESS_TTL_SECS";
pub const ENV_REFRESH_TTL_SECS: &str = "VAJRABOX_REFRESH_TTL_SECS";

const DEFAULT_DB_PATH: &str = "vajrabox.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub database_path: PathBuf,
    pub log_level: &'static str,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub token_secret: Option<String>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level(),
            log_dir: None,
            token_secret: None,
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }
}

impl Debug for CatalogConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("database_path", &self.database_path)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .field(
                "token_secret",
                &self.token_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level =
                normalize_level(&level).map_err(|reason| ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    value: level.clone(),
                    reason,
                })?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        config.token_secret = read(ENV_TOKEN_SECRET);
        if let Some(value) = read(ENV_ACCESS_TTL_SECS) {
            config.access_ttl = parse_ttl(ENV_ACCESS_TTL_SECS, &value)?;
        }
        if let Some(value) = read(ENV_REFRESH_TTL_SECS) {
            config.refresh_ttl = parse_ttl(ENV_REFRESH_TTL_SECS, &value)?;
        }
        Ok(config)
    }

    /// Token settings, when a signing secret is configured.
    pub fn token_settings(&self) -> Option<TokenSettings> {
        self.token_secret.as_ref().map(|secret| TokenSettings {
            secret: secret.clone(),
            access_ttl: self.access_ttl,
            refresh_ttl: self.refresh_ttl,
        })
    }
}

fn parse_ttl(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason,
    };
    let secs = value.parse::<u64>().map_err(|err| invalid(err.to_string()))?;
    if secs == 0 {
        return Err(invalid("must be at least one second".to_string()));
    }
    Ok(Duration::from_secs(secs))
}
