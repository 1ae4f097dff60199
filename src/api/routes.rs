//! API Routes
//!
//! Configures the Axum router with all forecast cache endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_status_handler, cleanup_handler, forecast_handler, health_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /cache/status` - Statistics, optionally with a cleanup pass
/// - `POST /cache/cleanup` - Delete expired forecasts
/// - `GET /forecast/:location/:date` - Cached or freshly fetched forecast
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache/status", get(cache_status_handler))
        .route("/cache/cleanup", post(cleanup_handler))
        .route("/forecast/:location/:date", get(forecast_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
