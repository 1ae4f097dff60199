//! Forecast Cache - a weather forecast cache server
//!
//! Shields a rate-limited weather API behind a persistent, TTL-bounded cache
//! with statistics and expired-entry reclamation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::WeatherCacheService;
pub use tasks::spawn_cleanup_task;
