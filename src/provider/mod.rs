//! Weather Provider Module
//!
//! The external forecast source the cache shields. Injected into the
//! service so tests can substitute it.

mod http;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::cache::ForecastPayload;

pub use http::HttpWeatherProvider;

// == Provider Error ==
/// Failure classification for a single provider call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Timeout, 5xx, throttling or transport failure; may succeed later
    #[error("transient provider failure: {0}")]
    Transient(String),

    /// The provider rejected the request (e.g. unknown location)
    #[error("provider rejected request: {0}")]
    Invalid(String),
}

// == Weather Provider ==
/// A single-shot forecast source.
///
/// Implementations perform no retries; retry policy belongs to the
/// implementation's own transport if it wants one.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetches the forecast for a normalized location and target date.
    async fn fetch_forecast(
        &self,
        location: &str,
        date: NaiveDate,
        day_offset: Option<u32>,
    ) -> Result<ForecastPayload, ProviderError>;
}
