//! Cache Statistics Module
//!
//! Read-only aggregation over a store snapshot. Owns the expiry threshold so
//! statistics and reclamation always agree on what counts as stale.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::cache::ForecastCacheEntry;

// == Expiry Threshold ==
/// Returns true when an entry expiring at `expires_at` is stale at `now`.
pub fn is_expired_at(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at <= now
}

// == Store Snapshot ==
/// Raw counts produced by a store scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Number of stored entries, expired or not
    pub total: usize,
    /// Entries with `expires_at <= now`
    pub expired: usize,
    /// Earliest `fetched_at` among stored entries
    pub oldest_fetched_at: Option<DateTime<Utc>>,
    /// Latest `fetched_at` among stored entries
    pub newest_fetched_at: Option<DateTime<Utc>>,
}

impl StoreSnapshot {
    /// Folds a set of entries into a snapshot as of `now`.
    pub fn from_entries<'a, I>(entries: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a ForecastCacheEntry>,
    {
        entries
            .into_iter()
            .fold(Self::default(), |mut snapshot, entry| {
                snapshot.record(entry.fetched_at, entry.expires_at, now);
                snapshot
            })
    }

    /// Adds one entry's timestamps to the snapshot.
    pub fn record(
        &mut self,
        fetched_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) {
        self.total += 1;
        if is_expired_at(expires_at, now) {
            self.expired += 1;
        }
        self.oldest_fetched_at = Some(match self.oldest_fetched_at {
            Some(oldest) => oldest.min(fetched_at),
            None => fetched_at,
        });
        self.newest_fetched_at = Some(match self.newest_fetched_at {
            Some(newest) => newest.max(fetched_at),
            None => fetched_at,
        });
    }
}

// == Cache Statistics ==
/// Summary reported to callers of the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatistics {
    /// Entries currently stored
    pub total_entries: usize,
    /// Expired entries not yet reclaimed
    pub expired_entries: usize,
    /// Entries still servable as fresh
    pub fresh_entries: usize,
    pub oldest_fetched_at: Option<DateTime<Utc>>,
    pub newest_fetched_at: Option<DateTime<Utc>>,
    /// Age of the oldest entry in seconds
    pub oldest_entry_age_secs: Option<i64>,
    /// Age of the newest entry in seconds
    pub newest_entry_age_secs: Option<i64>,
    /// Configured time-to-live in seconds
    pub ttl_secs: i64,
}

impl CacheStatistics {
    /// Shapes a snapshot into caller-facing statistics.
    pub fn from_snapshot(snapshot: StoreSnapshot, now: DateTime<Utc>, ttl: Duration) -> Self {
        let age_secs = |at: DateTime<Utc>| (now - at).num_seconds().max(0);

        Self {
            total_entries: snapshot.total,
            expired_entries: snapshot.expired,
            fresh_entries: snapshot.total.saturating_sub(snapshot.expired),
            oldest_fetched_at: snapshot.oldest_fetched_at,
            newest_fetched_at: snapshot.newest_fetched_at,
            oldest_entry_age_secs: snapshot.oldest_fetched_at.map(age_secs),
            newest_entry_age_secs: snapshot.newest_fetched_at.map(age_secs),
            ttl_secs: ttl.num_seconds(),
        }
    }
}
