//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::MAX_TTL_HOURS;
use crate::error::{CacheError, Result};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Forecast time-to-live in hours
    pub ttl_hours: u64,
    /// Optional capacity bound; unbounded when None
    pub max_entries: Option<usize>,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Upper bound on a provider call in seconds
    pub provider_timeout: u64,
    /// Serve expired forecasts when the provider is unavailable
    pub stale_fallback: bool,
    /// SQLite database path; in-memory store when None
    pub store_path: Option<String>,
    /// Weather provider endpoint
    pub weather_api_url: String,
    /// Weather provider API key
    pub weather_api_key: Option<String>,
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FORECAST_TTL_HOURS` - Forecast TTL in hours (default: 6)
    /// - `MAX_ENTRIES` - Capacity bound (default: unbounded)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 3600)
    /// - `PROVIDER_TIMEOUT_SECS` - Provider call timeout (default: 10)
    /// - `STALE_FALLBACK` - Serve stale entries on provider failure (default: true)
    /// - `STORE_PATH` - SQLite file path (default: in-memory store)
    /// - `WEATHER_API_URL` - Provider endpoint
    /// - `WEATHER_API_KEY` - Provider API key (optional)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_hours: env_parse("FORECAST_TTL_HOURS").unwrap_or(defaults.ttl_hours),
            max_entries: env_parse("MAX_ENTRIES"),
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: env_parse("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            provider_timeout: env_parse("PROVIDER_TIMEOUT_SECS")
                .unwrap_or(defaults.provider_timeout),
            stale_fallback: env_parse("STALE_FALLBACK").unwrap_or(defaults.stale_fallback),
            store_path: env_string("STORE_PATH"),
            weather_api_url: env_string("WEATHER_API_URL").unwrap_or(defaults.weather_api_url),
            weather_api_key: env_string("WEATHER_API_KEY"),
        }
    }

    /// Rejects values the cache cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.ttl_hours == 0 {
            return Err(CacheError::InvalidConfig(
                "FORECAST_TTL_HOURS must be greater than zero".to_string(),
            ));
        }
        if self.ttl_hours > MAX_TTL_HOURS {
            return Err(CacheError::InvalidConfig(format!(
                "FORECAST_TTL_HOURS cannot exceed {}",
                MAX_TTL_HOURS
            )));
        }
        if self.max_entries == Some(0) {
            return Err(CacheError::InvalidConfig(
                "MAX_ENTRIES must be greater than zero when set".to_string(),
            ));
        }
        if self.cleanup_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "CLEANUP_INTERVAL must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Forecast TTL as a chrono duration.
    ///
    /// # Errors
    /// `InvalidConfig` if `ttl_hours` is above [`MAX_TTL_HOURS`].
    pub fn ttl(&self) -> Result<chrono::Duration> {
        if self.ttl_hours > MAX_TTL_HOURS {
            return Err(CacheError::InvalidConfig(format!(
                "FORECAST_TTL_HOURS cannot exceed {}",
                MAX_TTL_HOURS
            )));
        }
        Ok(chrono::Duration::hours(self.ttl_hours as i64))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl_hours: 6,
            max_entries: None,
            server_port: 3000,
            cleanup_interval: 3600,
            provider_timeout: 10,
            stale_fallback: true,
            store_path: None,
            weather_api_url: "http://localhost:8080/forecast".to_string(),
            weather_api_key: None,
        }
    }
}
