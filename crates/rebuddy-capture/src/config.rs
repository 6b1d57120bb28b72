//! Transport configuration.
//!
//! # Design
//! - A single base URL plus a request timeout; nothing else is configurable.
//! - Environment lookup is injected so tests never touch process state.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Environment variable overriding the base URL.
pub const ENV_API_URL: &str = "REBUDDY_API_URL";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "REBUDDY_HTTP_TIMEOUT_SECS";

/// Settings for the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// API root; endpoint paths are resolved beneath it.
    pub base_url: Url,
    /// Upper bound on a single request, connection included.
    pub timeout: Duration,
}

impl TransportConfig {
    /// Build a configuration from explicit values.
    #[must_use]
    pub const fn new(base_url: Url, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }

    /// Read `REBUDDY_API_URL` and `REBUDDY_HTTP_TIMEOUT_SECS`, falling back to defaults.
    ///
    /// # Errors
    /// Returns an error when either variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`, falling back to defaults for unset keys.
    ///
    /// # Errors
    /// Returns an error when a provided value is unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(ENV_API_URL)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_base_url(&raw_url)?;

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) if !raw.trim().is_empty() => parse_timeout_secs(&raw)?,
            _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, timeout })
    }
}

/// Parse an API base URL.
///
/// # Errors
/// Returns an error when the value is not an absolute URL.
pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    value
        .trim()
        .parse::<Url>()
        .map_err(|source| ConfigError::InvalidUrl {
            value: value.to_string(),
            source,
        })
}

/// Parse a positive timeout expressed in whole seconds.
///
/// # Errors
/// Returns an error for zero, negative, or non-numeric input.
pub fn parse_timeout_secs(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(ConfigError::InvalidTimeout {
            value: value.to_string(),
        }),
    }
}
