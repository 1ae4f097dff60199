//! HTTP weather provider using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{ProviderError, WeatherProvider};
use crate::cache::ForecastPayload;

/// Fetches forecasts from a JSON HTTP endpoint.
///
/// Issues `GET {base_url}?location=..&date=YYYY-MM-DD[&days=N][&key=..]`
/// and returns the response body verbatim.
#[derive(Debug, Clone)]
pub struct HttpWeatherProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpWeatherProvider {
    /// Creates a provider with the given request timeout.
    ///
    /// A client that cannot be built is a setup problem, not a provider
    /// outage, so the builder error is returned as is.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Creates a provider with a custom HTTP client.
    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }
}

/// Maps an HTTP status onto the transient/permanent split.
fn classify_status(status: StatusCode) -> Option<ProviderError> {
    if status.is_success() {
        return None;
    }
    let detail = format!("HTTP {}", status);
    if status.is_client_error()
        && status != StatusCode::REQUEST_TIMEOUT
        && status != StatusCode::TOO_MANY_REQUESTS
    {
        Some(ProviderError::Invalid(detail))
    } else {
        Some(ProviderError::Transient(detail))
    }
}

#[async_trait]
impl WeatherProvider for HttpWeatherProvider {
    async fn fetch_forecast(
        &self,
        location: &str,
        date: NaiveDate,
        day_offset: Option<u32>,
    ) -> Result<ForecastPayload, ProviderError> {
        let mut query: Vec<(&str, String)> = vec![
            ("location", location.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        if let Some(days) = day_offset {
            query.push(("days", days.to_string()));
        }
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        debug!("Fetching forecast for {} on {}", location, date);

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;

        if let Some(err) = classify_status(response.status()) {
            return Err(err);
        }

        // A truncated or malformed body is never cached
        response
            .json::<ForecastPayload>()
            .await
            .map_err(|e| ProviderError::Transient(format!("Invalid forecast body: {}", e)))
    }
}
