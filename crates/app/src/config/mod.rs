use std::path::PathBuf;
use std::time::Duration;

use ingest::UpstreamTarget;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DB_FILE: &str = "cliproxy-dashboard.sqlite";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

pub const ENV_PASSWORD: &str = "PASSWORD";
pub const ENV_CRON_SECRET: &str = "CRON_SECRET";
pub const ENV_UPSTREAM_BASE_URL: &str = "CLIPROXY_API_BASE_URL";
pub const ENV_UPSTREAM_API_KEY: &str = "CLIPROXY_SECRET_KEY";
pub const ENV_DB_PATH: &str = "DASHBOARD_DB_PATH";
pub const ENV_UPSTREAM_TIMEOUT: &str = "UPSTREAM_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is missing")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Settings read once at startup and shared with every request.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub password: Option<String>,
    pub cron_secret: Option<String>,
    pub upstream_base_url: Option<String>,
    pub upstream_api_key: Option<String>,
    pub db_path: PathBuf,
    pub upstream_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            password: None,
            cron_secret: None,
            upstream_base_url: None,
            upstream_api_key: None,
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let upstream_api_key = read(ENV_UPSTREAM_API_KEY);
        let password = read(ENV_PASSWORD).or_else(|| upstream_api_key.clone());
        let upstream_timeout = match read(ENV_UPSTREAM_TIMEOUT) {
            Some(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::Invalid {
                        name: ENV_UPSTREAM_TIMEOUT,
                        value: value.clone(),
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };
        Ok(Self {
            password,
            cron_secret: read(ENV_CRON_SECRET),
            upstream_base_url: read(ENV_UPSTREAM_BASE_URL),
            upstream_api_key,
            db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
            upstream_timeout,
        })
    }

    /// True when at least one secret can authorize a request.
    pub fn has_auth_secret(&self) -> bool {
        self.password.is_some() || self.cron_secret.is_some()
    }

    pub fn assert_upstream(&self) -> Result<UpstreamTarget, ConfigError> {
        let base_url = self
            .upstream_base_url
            .clone()
            .ok_or(ConfigError::Missing(ENV_UPSTREAM_BASE_URL))?;
        let api_key = self
            .upstream_api_key
            .clone()
            .ok_or(ConfigError::Missing(ENV_UPSTREAM_API_KEY))?;
        Ok(UpstreamTarget { base_url, api_key })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RangeParams {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}
