//! Weather Cache Service
//!
//! The component callers talk to. Mediates between the forecast store and
//! the weather provider, and exposes statistics and reclamation.
//!
//! # Caller contract
//! Every operation assumes the caller has already been authenticated by the
//! request layer. The service performs no authorization of its own.

mod clock;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheStatistics, ForecastCacheEntry, ForecastKey, ForecastPayload, ForecastStore,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::provider::{ProviderError, WeatherProvider};

pub use clock::{Clock, ManualClock, SystemClock};

// == Service Options ==
/// Behavioural knobs for the service.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Upper bound on a single provider call
    pub provider_timeout: Duration,
    /// Serve an expired entry when a transient provider failure occurs
    pub stale_fallback: bool,
    /// Evict oldest entries past this count after each write
    pub max_entries: Option<usize>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(10),
            stale_fallback: true,
            max_entries: None,
        }
    }
}

impl From<&Config> for ServiceOptions {
    fn from(config: &Config) -> Self {
        Self {
            provider_timeout: Duration::from_secs(config.provider_timeout),
            stale_fallback: config.stale_fallback,
            max_entries: config.max_entries,
        }
    }
}

// == Results ==
/// Where a returned forecast came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ForecastSource {
    /// Fresh cache hit
    Cache,
    /// Fetched from the provider on this request
    Provider,
    /// Expired entry served because the provider was unavailable
    StaleFallback,
}

/// A forecast together with its cache metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedForecast {
    pub key: ForecastKey,
    pub payload: ForecastPayload,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub source: ForecastSource,
}

impl CachedForecast {
    fn from_entry(entry: ForecastCacheEntry, source: ForecastSource) -> Self {
        Self {
            key: entry.key,
            payload: entry.payload,
            fetched_at: entry.fetched_at,
            expires_at: entry.expires_at,
            source,
        }
    }
}

/// Outcome of a reclamation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub deleted_forecasts: usize,
    pub cleaned_at: DateTime<Utc>,
}

// == Weather Cache Service ==
/// Orchestrates cache lookups, provider fetches and reclamation.
///
/// Holds no mutable state of its own; per-key atomicity is delegated to
/// the injected store.
#[derive(Clone)]
pub struct WeatherCacheService {
    store: Arc<dyn ForecastStore>,
    provider: Arc<dyn WeatherProvider>,
    clock: Arc<dyn Clock>,
    options: ServiceOptions,
}

impl WeatherCacheService {
    // == Constructor ==
    /// Creates a service using wall-clock time.
    pub fn new(
        store: Arc<dyn ForecastStore>,
        provider: Arc<dyn WeatherProvider>,
        options: ServiceOptions,
    ) -> Self {
        Self::with_clock(store, provider, Arc::new(SystemClock), options)
    }

    /// Creates a service with an explicit time source.
    pub fn with_clock(
        store: Arc<dyn ForecastStore>,
        provider: Arc<dyn WeatherProvider>,
        clock: Arc<dyn Clock>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            provider,
            clock,
            options,
        }
    }

    // == Statistics ==
    /// Summarizes the store contents. Never mutates state.
    ///
    /// # Errors
    /// `StoreUnavailable` if the store cannot be scanned.
    pub async fn get_cache_stats(&self) -> Result<CacheStatistics> {
        let now = self.clock.now();
        let snapshot = self.store.scan_stats(now).await?;
        Ok(CacheStatistics::from_snapshot(snapshot, now, self.store.ttl()))
    }

    // == Cleanup ==
    /// Deletes every expired forecast and reports how many were removed.
    ///
    /// Uses the same threshold as `get_cache_stats`, so an immediate second
    /// call returns zero unless new entries expired in between.
    ///
    /// # Errors
    /// `StoreUnavailable` if the store cannot be swept.
    pub async fn cleanup_old_forecasts(&self) -> Result<CleanupReport> {
        let now = self.clock.now();
        let deleted = self.store.delete_expired(now).await?;

        if deleted > 0 {
            info!("Forecast cleanup: removed {} expired entries", deleted);
        } else {
            debug!("Forecast cleanup: no expired entries found");
        }

        Ok(CleanupReport {
            deleted_forecasts: deleted,
            cleaned_at: now,
        })
    }

    // == Get Forecast ==
    /// Returns the forecast for a location and date, fetching on miss.
    ///
    /// A fresh entry is served from the store. A missing or expired entry
    /// triggers a provider fetch; the result is written only once a complete
    /// payload has arrived. If the fetch fails transiently and an expired
    /// entry exists, that entry is served with
    /// [`ForecastSource::StaleFallback`] when fallback is enabled.
    ///
    /// Capacity eviction runs after a successful write; if it fails the
    /// failure is logged and the stored forecast is still returned.
    ///
    /// # Errors
    /// - `InvalidRequest` for an unusable location
    /// - `StoreUnavailable` on storage failure (never treated as a miss)
    /// - `ProviderFetchFailed` on a transient failure with no fallback
    /// - `ProviderFetchInvalid` when the provider rejects the request
    pub async fn get_forecast(
        &self,
        location: &str,
        date: NaiveDate,
        day_offset: Option<u32>,
    ) -> Result<CachedForecast> {
        let key = ForecastKey::new(location, date, day_offset)?;
        let cached = self.store.get(&key).await?;

        if let Some(entry) = &cached {
            if !entry.is_expired_at(self.clock.now()) {
                debug!("Forecast cache hit for {}", key);
                return Ok(CachedForecast::from_entry(entry.clone(), ForecastSource::Cache));
            }
            debug!("Forecast cache entry for {} is stale", key);
        } else {
            debug!("Forecast cache miss for {}", key);
        }

        match self.fetch(&key).await {
            Ok(payload) => {
                let entry = self.store.put(&key, payload, self.clock.now()).await?;
                if let Err(err) = self.enforce_capacity().await {
                    warn!("Capacity eviction failed after storing {}: {}", key, err);
                }
                Ok(CachedForecast::from_entry(entry, ForecastSource::Provider))
            }
            Err(CacheError::ProviderFetchFailed(reason)) => match cached {
                Some(entry) if self.options.stale_fallback => {
                    warn!(
                        "Serving stale forecast for {} (expired {}): {}",
                        key, entry.expires_at, reason
                    );
                    Ok(CachedForecast::from_entry(entry, ForecastSource::StaleFallback))
                }
                _ => Err(CacheError::ProviderFetchFailed(reason)),
            },
            Err(err) => Err(err),
        }
    }

    /// Calls the provider under the configured timeout.
    async fn fetch(&self, key: &ForecastKey) -> Result<ForecastPayload> {
        let call = self
            .provider
            .fetch_forecast(key.location(), key.date(), key.day_offset());

        match tokio::time::timeout(self.options.provider_timeout, call).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(ProviderError::Transient(reason))) => {
                Err(CacheError::ProviderFetchFailed(reason))
            }
            Ok(Err(ProviderError::Invalid(reason))) => {
                Err(CacheError::ProviderFetchInvalid(reason))
            }
            Err(_) => Err(CacheError::ProviderFetchFailed(format!(
                "timed out after {:?}",
                self.options.provider_timeout
            ))),
        }
    }

    async fn enforce_capacity(&self) -> Result<()> {
        if let Some(max_entries) = self.options.max_entries {
            let evicted = self.store.evict_oldest(max_entries).await?;
            if evicted > 0 {
                debug!("Capacity eviction: removed {} oldest forecasts", evicted);
            }
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryForecastStore, StoreSnapshot};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays queued responses, falling back to a canned payload.
    #[derive(Default)]
    struct ScriptedProvider {
        responses: Mutex<VecDeque<std::result::Result<ForecastPayload, ProviderError>>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedProvider {
        fn with(responses: Vec<std::result::Result<ForecastPayload, ProviderError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch_forecast(
            &self,
            location: &str,
            date: NaiveDate,
            _day_offset: Option<u32>,
        ) -> std::result::Result<ForecastPayload, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.responses.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(json!({"location": location, "date": date.to_string()})))
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    struct Harness {
        service: WeatherCacheService,
        store: Arc<MemoryForecastStore>,
        provider: Arc<ScriptedProvider>,
        clock: Arc<ManualClock>,
    }

    fn harness(provider: ScriptedProvider, options: ServiceOptions) -> Harness {
        let store = Arc::new(MemoryForecastStore::new(chrono::Duration::hours(6)).unwrap());
        let provider = Arc::new(provider);
        let clock = Arc::new(ManualClock::new(t0()));
        let service = WeatherCacheService::with_clock(
            store.clone(),
            provider.clone(),
            clock.clone(),
            options,
        );
        Harness {
            service,
            store,
            provider,
            clock,
        }
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores() {
        let h = harness(
            ScriptedProvider::with(vec![Ok(json!("payload_a"))]),
            ServiceOptions::default(),
        );

        let forecast = h.service.get_forecast("Denver", day(), None).await.unwrap();
        assert_eq!(forecast.source, ForecastSource::Provider);
        assert_eq!(forecast.payload, json!("payload_a"));
        assert_eq!(forecast.expires_at, t0() + chrono::Duration::hours(6));
        assert_eq!(h.store.len(), 1);
    }

    #[tokio::test]
    async fn test_hit_skips_provider() {
        let h = harness(ScriptedProvider::default(), ServiceOptions::default());

        h.service.get_forecast("Denver", day(), None).await.unwrap();
        h.clock.advance(chrono::Duration::hours(5));
        let forecast = h.service.get_forecast(" DENVER ", day(), None).await.unwrap();

        assert_eq!(forecast.source, ForecastSource::Cache);
        assert_eq!(h.provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let h = harness(
            ScriptedProvider::with(vec![Ok(json!("old")), Ok(json!("new"))]),
            ServiceOptions::default(),
        );

        h.service.get_forecast("denver", day(), None).await.unwrap();
        h.clock.advance(chrono::Duration::hours(6));
        let forecast = h.service.get_forecast("denver", day(), None).await.unwrap();

        assert_eq!(forecast.source, ForecastSource::Provider);
        assert_eq!(forecast.payload, json!("new"));
        assert_eq!(forecast.fetched_at, t0() + chrono::Duration::hours(6));
        assert_eq!(h.provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_fallback_on_transient_failure() {
        let h = harness(
            ScriptedProvider::with(vec![
                Ok(json!("payload_a")),
                Err(ProviderError::Transient("HTTP 503".into())),
            ]),
            ServiceOptions::default(),
        );

        h.service.get_forecast("denver", day(), None).await.unwrap();
        h.clock.advance(chrono::Duration::hours(7));
        let forecast = h.service.get_forecast("denver", day(), None).await.unwrap();

        assert_eq!(forecast.source, ForecastSource::StaleFallback);
        assert_eq!(forecast.payload, json!("payload_a"));
    }

    #[tokio::test]
    async fn test_stale_fallback_disabled() {
        let options = ServiceOptions {
            stale_fallback: false,
            ..Default::default()
        };
        let h = harness(
            ScriptedProvider::with(vec![
                Ok(json!("payload_a")),
                Err(ProviderError::Transient("HTTP 503".into())),
            ]),
            options,
        );

        h.service.get_forecast("denver", day(), None).await.unwrap();
        h.clock.advance(chrono::Duration::hours(7));
        let result = h.service.get_forecast("denver", day(), None).await;

        assert!(matches!(result, Err(CacheError::ProviderFetchFailed(_))));
    }

    #[tokio::test]
    async fn test_transient_failure_without_entry() {
        let h = harness(
            ScriptedProvider::with(vec![Err(ProviderError::Transient("HTTP 500".into()))]),
            ServiceOptions::default(),
        );

        let result = h.service.get_forecast("denver", day(), None).await;
        assert!(matches!(result, Err(CacheError::ProviderFetchFailed(_))));
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_location_never_falls_back() {
        let h = harness(
            ScriptedProvider::with(vec![
                Ok(json!("payload_a")),
                Err(ProviderError::Invalid("unknown location".into())),
            ]),
            ServiceOptions::default(),
        );

        h.service.get_forecast("denver", day(), None).await.unwrap();
        h.clock.advance(chrono::Duration::hours(7));
        let result = h.service.get_forecast("denver", day(), None).await;

        assert!(matches!(result, Err(CacheError::ProviderFetchInvalid(_))));
    }

    #[tokio::test]
    async fn test_provider_timeout_leaves_store_untouched() {
        let provider = ScriptedProvider {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        };
        let options = ServiceOptions {
            provider_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let h = harness(provider, options);

        let result = h.service.get_forecast("denver", day(), None).await;
        assert!(matches!(result, Err(CacheError::ProviderFetchFailed(_))));
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_empty_location_rejected_before_fetch() {
        let h = harness(ScriptedProvider::default(), ServiceOptions::default());

        let result = h.service.get_forecast("   ", day(), None).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_capacity_bound_evicts_oldest() {
        let options = ServiceOptions {
            max_entries: Some(2),
            ..Default::default()
        };
        let h = harness(ScriptedProvider::default(), options);

        for location in ["a", "b", "c"] {
            h.service.get_forecast(location, day(), None).await.unwrap();
            h.clock.advance(chrono::Duration::minutes(1));
        }

        assert_eq!(h.store.len(), 2);
        let key_a = ForecastKey::new("a", day(), None).unwrap();
        assert!(h.store.get(&key_a).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_denver_scenario() {
        let h = harness(
            ScriptedProvider::with(vec![Ok(json!("payload_a"))]),
            ServiceOptions::default(),
        );
        let key = ForecastKey::new("denver", day(), None).unwrap();
        assert_eq!(key.to_string(), "denver|2024-01-10");

        h.service.get_forecast("denver", day(), None).await.unwrap();

        h.clock.set(t0() + chrono::Duration::hours(5));
        let entry = h.store.get(&key).await.unwrap().unwrap();
        assert_eq!(entry.payload, json!("payload_a"));
        assert!(!entry.is_expired_at(h.clock.now()));

        h.clock.set(t0() + chrono::Duration::hours(7));
        assert!(entry.is_expired_at(h.clock.now()));
        assert_eq!(h.service.get_cache_stats().await.unwrap().expired_entries, 1);

        let report = h.service.cleanup_old_forecasts().await.unwrap();
        assert_eq!(report.deleted_forecasts, 1);
        assert_eq!(report.cleaned_at, t0() + chrono::Duration::hours(7));
        assert!(h.store.get(&key).await.unwrap().is_none());

        let report = h.service.cleanup_old_forecasts().await.unwrap();
        assert_eq!(report.deleted_forecasts, 0);
    }

    #[tokio::test]
    async fn test_stats_do_not_mutate() {
        let h = harness(ScriptedProvider::default(), ServiceOptions::default());

        h.service.get_forecast("denver", day(), None).await.unwrap();
        h.clock.advance(chrono::Duration::hours(8));

        let first = h.service.get_cache_stats().await.unwrap();
        let second = h.service.get_cache_stats().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.total_entries, 1);
        assert_eq!(first.expired_entries, 1);
        assert_eq!(h.store.len(), 1);
    }

    /// A store whose backend is down for every operation.
    struct UnavailableStore;

    fn store_down() -> CacheError {
        CacheError::StoreUnavailable("database is locked".into())
    }

    #[async_trait]
    impl ForecastStore for UnavailableStore {
        async fn get(&self, _key: &ForecastKey) -> Result<Option<ForecastCacheEntry>> {
            Err(store_down())
        }

        async fn put(
            &self,
            _key: &ForecastKey,
            _payload: ForecastPayload,
            _fetched_at: DateTime<Utc>,
        ) -> Result<ForecastCacheEntry> {
            Err(store_down())
        }

        async fn delete_expired(&self, _now: DateTime<Utc>) -> Result<usize> {
            Err(store_down())
        }

        async fn scan_stats(&self, _now: DateTime<Utc>) -> Result<StoreSnapshot> {
            Err(store_down())
        }

        async fn evict_oldest(&self, _max_entries: usize) -> Result<usize> {
            Err(store_down())
        }

        fn ttl(&self) -> chrono::Duration {
            chrono::Duration::hours(6)
        }
    }

    /// Delegates to a memory store but cannot evict.
    struct NoEvictStore {
        inner: MemoryForecastStore,
    }

    #[async_trait]
    impl ForecastStore for NoEvictStore {
        async fn get(&self, key: &ForecastKey) -> Result<Option<ForecastCacheEntry>> {
            self.inner.get(key).await
        }

        async fn put(
            &self,
            key: &ForecastKey,
            payload: ForecastPayload,
            fetched_at: DateTime<Utc>,
        ) -> Result<ForecastCacheEntry> {
            self.inner.put(key, payload, fetched_at).await
        }

        async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
            self.inner.delete_expired(now).await
        }

        async fn scan_stats(&self, now: DateTime<Utc>) -> Result<StoreSnapshot> {
            self.inner.scan_stats(now).await
        }

        async fn evict_oldest(&self, _max_entries: usize) -> Result<usize> {
            Err(store_down())
        }

        fn ttl(&self) -> chrono::Duration {
            self.inner.ttl()
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_not_a_miss() {
        let provider = Arc::new(ScriptedProvider::default());
        let service = WeatherCacheService::with_clock(
            Arc::new(UnavailableStore),
            provider.clone(),
            Arc::new(ManualClock::new(t0())),
            ServiceOptions::default(),
        );

        let result = service.get_forecast("denver", day(), None).await;
        assert!(matches!(result, Err(CacheError::StoreUnavailable(_))));
        assert_eq!(provider.calls(), 0);

        assert!(matches!(
            service.get_cache_stats().await,
            Err(CacheError::StoreUnavailable(_))
        ));
        assert!(matches!(
            service.cleanup_old_forecasts().await,
            Err(CacheError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_eviction_failure_still_returns_stored_forecast() {
        let store = Arc::new(NoEvictStore {
            inner: MemoryForecastStore::new(chrono::Duration::hours(6)).unwrap(),
        });
        let options = ServiceOptions {
            max_entries: Some(1),
            ..Default::default()
        };
        let service = WeatherCacheService::with_clock(
            store.clone(),
            Arc::new(ScriptedProvider::default()),
            Arc::new(ManualClock::new(t0())),
            options,
        );

        for location in ["denver", "aspen"] {
            let forecast = service.get_forecast(location, day(), None).await.unwrap();
            assert_eq!(forecast.source, ForecastSource::Provider);
        }

        // Both writes landed even though the bound could not be enforced
        assert_eq!(store.inner.len(), 2);
        let forecast = service.get_forecast("aspen", day(), None).await.unwrap();
        assert_eq!(forecast.source, ForecastSource::Cache);
    }
}
