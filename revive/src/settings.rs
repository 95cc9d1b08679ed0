use revive_providers::gce::GceConfig;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PROVIDER: &str = "gce";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    ZeroTimeout { name: &'static str },
}

/// Process configuration, read from the environment (and `.env` via dotenv in `main`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: String,
    pub gce: GceConfig,
    pub mock_instance_status: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Unset variables keep the `GceConfig::default()` values. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let number = |name: &'static str| -> Result<Option<u64>, SettingsError> {
            get(name)
                .map(|v| {
                    v.parse::<u64>()
                        .map_err(|_| SettingsError::InvalidNumber { name, value: v })
                })
                .transpose()
        };
        // A zero reqwest timeout fails every call immediately.
        let timeout = |name: &'static str, default: Duration| match number(name)? {
            Some(0) => Err(SettingsError::ZeroTimeout { name }),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(default),
        };

        let defaults = GceConfig::default();
        let gce = GceConfig {
            api_base_url: get("GCE_API_BASE_URL").unwrap_or(defaults.api_base_url),
            access_token: get("GCE_ACCESS_TOKEN"),
            access_token_file: get("GCE_ACCESS_TOKEN_FILE").map(PathBuf::from),
            metadata_token_url: get("GCE_METADATA_TOKEN_URL")
                .unwrap_or(defaults.metadata_token_url),
            connect_timeout: timeout("GCE_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            request_timeout: timeout("GCE_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
            poll_interval: number("GCE_POLL_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        };

        Ok(Self {
            provider: get("PROVIDER")
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            gce,
            mock_instance_status: get("MOCK_INSTANCE_STATUS")
                .unwrap_or_else(|| "RUNNING".to_string()),
        })
    }
}
