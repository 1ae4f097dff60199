//! Response DTOs for the forecast cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheStatistics, ForecastPayload};
use crate::service::{CachedForecast, CleanupReport, ForecastSource};

/// Response body for the cache status endpoint (GET /cache/status)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatusResponse {
    pub success: bool,
    /// Present unless suppressed with `stats=false`
    pub stats: Option<CacheStatistics>,
    /// Present only when requested with `cleanup=true`
    pub cleanup: Option<CleanupReport>,
    pub timestamp: DateTime<Utc>,
}

impl CacheStatusResponse {
    /// Creates a successful status response
    pub fn new(stats: Option<CacheStatistics>, cleanup: Option<CleanupReport>) -> Self {
        Self {
            success: true,
            stats,
            cleanup,
            timestamp: Utc::now(),
        }
    }
}

/// Response body for the cleanup endpoint (POST /cache/cleanup)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub deleted_forecasts: usize,
    pub cleaned_at: DateTime<Utc>,
}

impl From<CleanupReport> for CleanupResponse {
    fn from(report: CleanupReport) -> Self {
        Self {
            success: true,
            deleted_forecasts: report.deleted_forecasts,
            cleaned_at: report.cleaned_at,
        }
    }
}

/// Response body for the forecast endpoint (GET /forecast/:location/:date)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub success: bool,
    /// Canonical cache key the forecast is stored under
    pub key: String,
    pub source: ForecastSource,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Provider payload, verbatim
    pub forecast: ForecastPayload,
}

impl From<CachedForecast> for ForecastResponse {
    fn from(forecast: CachedForecast) -> Self {
        Self {
            success: true,
            key: forecast.key.to_string(),
            source: forecast.source,
            fetched_at: forecast.fetched_at,
            expires_at: forecast.expires_at,
            forecast: forecast.payload,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Generic message; never carries storage or provider detail
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
