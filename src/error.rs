//! Error types for the forecast cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the forecast cache.
///
/// Messages carry internal detail for logs only. The HTTP mapping below
/// replaces them with generic text.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Storage layer I/O or decoding failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Transient provider failure (timeout, 5xx, transport)
    #[error("Provider fetch failed: {0}")]
    ProviderFetchFailed(String),

    /// Permanent provider failure (unknown location, rejected request)
    #[error("Provider rejected request: {0}")]
    ProviderFetchInvalid(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<async_sqlite::Error> for CacheError {
    fn from(err: async_sqlite::Error) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::ProviderFetchInvalid(_) => {
                warn!(error = %self, "Provider rejected forecast request");
                (
                    StatusCode::BAD_REQUEST,
                    "Forecast unavailable for the requested location".to_string(),
                )
            }
            CacheError::ProviderFetchFailed(_) => {
                warn!(error = %self, "Provider fetch failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Weather provider unavailable".to_string(),
                )
            }
            CacheError::StoreUnavailable(_) | CacheError::InvalidConfig(_) => {
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the forecast cache.
pub type Result<T> = std::result::Result<T, CacheError>;
