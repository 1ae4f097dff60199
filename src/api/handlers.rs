//! API Handlers
//!
//! HTTP request handlers for each forecast cache endpoint. Requests reach
//! these handlers only after the surrounding layer has authenticated them.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;

use crate::cache::{ForecastStore, MemoryForecastStore, SqliteForecastStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    CacheStatusResponse, CleanupResponse, ForecastQuery, ForecastResponse, HealthResponse,
    StatusQuery,
};
use crate::provider::HttpWeatherProvider;
use crate::service::{ServiceOptions, WeatherCacheService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The forecast cache service
    pub service: Arc<WeatherCacheService>,
}

impl AppState {
    /// Creates a new AppState around an already-built service.
    pub fn new(service: WeatherCacheService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the SQLite store when `store_path` is set, otherwise an
    /// in-memory store, and wires in the HTTP weather provider.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let ttl = config.ttl()?;

        let store: Arc<dyn ForecastStore> = match &config.store_path {
            Some(path) => Arc::new(SqliteForecastStore::open(path, ttl).await?),
            None => Arc::new(MemoryForecastStore::new(ttl)?),
        };

        let options = ServiceOptions::from(config);
        let provider = HttpWeatherProvider::new(
            config.weather_api_url.clone(),
            config.weather_api_key.clone(),
            options.provider_timeout,
        )
        .map_err(|e| CacheError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::new(WeatherCacheService::new(
            store,
            Arc::new(provider),
            options,
        )))
    }
}

/// Handler for GET /cache/status
///
/// Reports statistics unless `stats=false`; runs and reports a cleanup pass
/// only when `cleanup=true`. Cleanup runs first so the statistics reflect it.
pub async fn cache_status_handler(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<CacheStatusResponse>> {
    let cleanup = if query.run_cleanup() {
        Some(state.service.cleanup_old_forecasts().await?)
    } else {
        None
    };

    let stats = if query.include_stats() {
        Some(state.service.get_cache_stats().await?)
    } else {
        None
    };

    Ok(Json(CacheStatusResponse::new(stats, cleanup)))
}

/// Handler for POST /cache/cleanup
///
/// Deletes expired forecasts and reports the count.
pub async fn cleanup_handler(State(state): State<AppState>) -> Result<Json<CleanupResponse>> {
    let report = state.service.cleanup_old_forecasts().await?;
    Ok(Json(report.into()))
}

/// Handler for GET /forecast/:location/:date
///
/// Serves a cached forecast or fetches a fresh one.
pub async fn forecast_handler(
    State(state): State<AppState>,
    Path((location, date)): Path<(String, String)>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastResponse>> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
        CacheError::InvalidRequest(format!("Invalid date '{}', expected YYYY-MM-DD", date))
    })?;

    let forecast = state
        .service
        .get_forecast(&location, date, query.day_offset)
        .await?;

    Ok(Json(forecast.into()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
