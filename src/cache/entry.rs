//! Cache Entry Module
//!
//! Defines the structure for individual forecast entries with TTL support.

use chrono::{DateTime, Duration, Utc};

use crate::cache::stats::is_expired_at;
use crate::cache::ForecastKey;
use crate::error::{CacheError, Result};

/// Forecast data exactly as returned by the weather provider.
pub type ForecastPayload = serde_json::Value;

// == Forecast Cache Entry ==
/// Represents a single cached forecast with fetch and expiry metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCacheEntry {
    /// Canonical cache key
    pub key: ForecastKey,
    /// The stored provider payload
    pub payload: ForecastPayload,
    /// When the payload was retrieved from the provider
    pub fetched_at: DateTime<Utc>,
    /// `fetched_at + ttl`
    pub expires_at: DateTime<Utc>,
}

impl ForecastCacheEntry {
    // == Constructor ==
    /// Creates a new entry, deriving `expires_at` from the TTL.
    ///
    /// Callers guarantee `ttl` is strictly positive; stores validate it once
    /// at construction.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if `fetched_at + ttl` is not representable.
    pub fn new(
        key: ForecastKey,
        payload: ForecastPayload,
        fetched_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self> {
        let expires_at = fetched_at.checked_add_signed(ttl).ok_or_else(|| {
            CacheError::InvalidRequest(format!(
                "Expiry out of range for forecast fetched at {}",
                fetched_at
            ))
        })?;

        Ok(Self {
            key,
            payload,
            fetched_at,
            expires_at,
        })
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired_at(self.expires_at, now)
    }

    // == Age ==
    /// Time elapsed since the payload was fetched, floored at zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).max(Duration::zero())
    }
}
