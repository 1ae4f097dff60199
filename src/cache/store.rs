//! Forecast Store Module
//!
//! Storage primitives shared by every forecast store backend.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::cache::{
    ForecastCacheEntry, ForecastKey, ForecastPayload, StoreSnapshot, MAX_TTL_HOURS,
};
use crate::error::{CacheError, Result};

// == Forecast Store ==
/// Key-addressed storage for cached forecasts.
///
/// Implementations must:
/// - return entries from `get()` regardless of expiry
/// - replace an existing entry atomically on `put()`
/// - reclaim expired rows individually, without a store-wide lock
/// - report every I/O failure as `StoreUnavailable`, never as a miss
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// Retrieves the entry for `key`, expired or not.
    async fn get(&self, key: &ForecastKey) -> Result<Option<ForecastCacheEntry>>;

    /// Upserts a payload, deriving `expires_at` from the store TTL.
    async fn put(
        &self,
        key: &ForecastKey,
        payload: ForecastPayload,
        fetched_at: DateTime<Utc>,
    ) -> Result<ForecastCacheEntry>;

    /// Deletes every entry with `expires_at <= now`.
    ///
    /// Returns the number of entries removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Counts entries and fetch-time bounds as of `now`.
    async fn scan_stats(&self, now: DateTime<Utc>) -> Result<StoreSnapshot>;

    /// Removes the oldest entries by `fetched_at` until at most
    /// `max_entries` remain.
    ///
    /// Returns the number of entries removed.
    async fn evict_oldest(&self, max_entries: usize) -> Result<usize>;

    /// Time-to-live applied on `put()`.
    fn ttl(&self) -> Duration;
}

/// Rejects a TTL that would break `expires_at > fetched_at` or overflow
/// timestamp arithmetic.
pub(crate) fn validate_ttl(ttl: Duration) -> Result<Duration> {
    if ttl <= Duration::zero() {
        return Err(CacheError::InvalidConfig(
            "Forecast TTL must be greater than zero".to_string(),
        ));
    }
    if ttl > Duration::hours(MAX_TTL_HOURS as i64) {
        return Err(CacheError::InvalidConfig(format!(
            "Forecast TTL cannot exceed {} hours",
            MAX_TTL_HOURS
        )));
    }
    Ok(ttl)
}
