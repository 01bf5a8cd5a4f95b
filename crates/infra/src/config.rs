//! Environment-driven configuration.

use std::time::Duration;

/// Runtime settings for the store, auth and change-feed adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialsConfig {
    /// Base URL of the hosted backend (REST under `/rest/v1`, auth under `/auth/v1`).
    pub api_url: String,
    /// Public API key sent with every request.
    pub api_key: String,
    /// Direct Postgres URL; enables `LISTEN`-based change notifications.
    pub database_url: Option<String>,
    pub change_channels: Vec<String>,
    pub refresh_quiet: Duration,
    pub dashboard_days: u32,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

pub const DEFAULT_CHANGE_CHANNELS: [&str; 2] = ["stock_moves_changes", "items_changes"];
pub const DEFAULT_REFRESH_QUIET_MS: u64 = 450;
pub const DEFAULT_DASHBOARD_DAYS: u32 = 14;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

impl MaterialsConfig {
    /// Config with defaults for everything but the endpoint and key.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            database_url: None,
            change_channels: DEFAULT_CHANGE_CHANNELS.iter().map(|c| c.to_string()).collect(),
            refresh_quiet: Duration::from_millis(DEFAULT_REFRESH_QUIET_MS),
            dashboard_days: DEFAULT_DASHBOARD_DAYS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_url = get("MATERIALS_API_URL").ok_or(ConfigError::Missing("MATERIALS_API_URL"))?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "MATERIALS_API_URL",
                value: api_url,
                reason: "expected an http(s) URL",
            });
        }
        let api_key = get("MATERIALS_API_KEY").ok_or(ConfigError::Missing("MATERIALS_API_KEY"))?;

        let mut config = Self::new(api_url, api_key);
        config.database_url = get("MATERIALS_DATABASE_URL");

        if let Some(raw) = get("MATERIALS_CHANGE_CHANNELS") {
            let channels: Vec<String> = raw
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if channels.is_empty() {
                return Err(ConfigError::Invalid {
                    key: "MATERIALS_CHANGE_CHANNELS",
                    value: raw,
                    reason: "expected a comma-separated list",
                });
            }
            config.change_channels = channels;
        }

        if let Some(ms) = parse_number::<u64>(&get, "MATERIALS_REFRESH_QUIET_MS")? {
            config.refresh_quiet = Duration::from_millis(ms);
        }
        if let Some(days) = parse_number::<u32>(&get, "MATERIALS_DASHBOARD_DAYS")? {
            if days == 0 {
                return Err(ConfigError::Invalid {
                    key: "MATERIALS_DASHBOARD_DAYS",
                    value: days.to_string(),
                    reason: "must be at least 1",
                });
            }
            config.dashboard_days = days;
        }
        if let Some(secs) = parse_number::<u64>(&get, "MATERIALS_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.api_url)
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.api_url)
    }

    /// Shared HTTP client honoring the request timeout.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
    }
}

fn parse_number<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match get(key) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| ConfigError::Invalid {
            key,
            value,
            reason: "expected a non-negative integer",
        }),
    }
}
