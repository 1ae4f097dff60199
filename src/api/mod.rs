//! API Module
//!
//! HTTP handlers and routing for the forecast cache REST API.
//!
//! # Endpoints
//! - `GET /cache/status` - Cache statistics with optional cleanup
//! - `POST /cache/cleanup` - Delete expired forecasts
//! - `GET /forecast/:location/:date` - Get a forecast through the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
