//! In-memory forecast store backed by DashMap

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::cache::store::validate_ttl;
use crate::cache::{
    ForecastCacheEntry, ForecastKey, ForecastPayload, ForecastStore, StoreSnapshot,
};
use crate::error::Result;

// == Memory Forecast Store ==
/// A concurrent, sharded in-memory forecast store.
///
/// Each key lives in one shard; writers lock only that shard, so reclamation
/// and upserts on unrelated keys proceed independently. Data is lost when
/// the process exits.
#[derive(Debug)]
pub struct MemoryForecastStore {
    entries: DashMap<ForecastKey, ForecastCacheEntry>,
    ttl: Duration,
}

impl MemoryForecastStore {
    // == Constructor ==
    /// Creates an empty store with the given TTL.
    pub fn new(ttl: Duration) -> Result<Self> {
        Ok(Self {
            entries: DashMap::new(),
            ttl: validate_ttl(ttl)?,
        })
    }

    /// Returns the number of stored entries, including expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ForecastStore for MemoryForecastStore {
    async fn get(&self, key: &ForecastKey) -> Result<Option<ForecastCacheEntry>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(
        &self,
        key: &ForecastKey,
        payload: ForecastPayload,
        fetched_at: DateTime<Utc>,
    ) -> Result<ForecastCacheEntry> {
        let entry = ForecastCacheEntry::new(key.clone(), payload, fetched_at, self.ttl)?;
        self.entries.insert(key.clone(), entry.clone());
        Ok(entry)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        // retain() holds one shard at a time and evaluates each row under
        // that shard's lock, so a refresh that lands first is kept
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            if entry.is_expired_at(now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn scan_stats(&self, now: DateTime<Utc>) -> Result<StoreSnapshot> {
        let mut snapshot = StoreSnapshot::default();
        for entry in self.entries.iter() {
            snapshot.record(entry.fetched_at, entry.expires_at, now);
        }
        Ok(snapshot)
    }

    async fn evict_oldest(&self, max_entries: usize) -> Result<usize> {
        let excess = self.entries.len().saturating_sub(max_entries);
        if excess == 0 {
            return Ok(0);
        }

        let mut by_age: Vec<(DateTime<Utc>, ForecastKey)> = self
            .entries
            .iter()
            .map(|entry| (entry.fetched_at, entry.key().clone()))
            .collect();
        by_age.sort_by(|a, b| a.0.cmp(&b.0));

        let mut removed = 0;
        for (fetched_at, key) in by_age.into_iter().take(excess) {
            // Skip keys refreshed since the scan
            if self
                .entries
                .remove_if(&key, |_, entry| entry.fetched_at == fetched_at)
                .is_some()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
