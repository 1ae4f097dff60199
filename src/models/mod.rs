//! Request and Response models for the forecast cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP query strings and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ForecastQuery, StatusQuery};
pub use responses::{
    CacheStatusResponse, CleanupResponse, ErrorResponse, ForecastResponse, HealthResponse,
};
