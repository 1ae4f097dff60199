//! SQLite-backed persistent forecast store.

use std::path::Path;

use async_sqlite::rusqlite::{self, OptionalExtension};
use async_sqlite::{Client, ClientBuilder, JournalMode};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::debug;

use crate::cache::store::validate_ttl;
use crate::cache::{
    ForecastCacheEntry, ForecastKey, ForecastPayload, ForecastStore, StoreSnapshot,
};
use crate::error::{CacheError, Result};

/// A persistent forecast store backed by SQLite.
///
/// Entries survive process restarts. Every primitive is a single statement,
/// so SQLite's row-level atomicity is the only synchronization needed.
/// Timestamps are stored as Unix nanoseconds so a row reads back exactly
/// as it was written.
///
/// # Example
///
/// ```ignore
/// let store = SqliteForecastStore::open("forecasts.db", Duration::hours(6)).await?;
/// ```
pub struct SqliteForecastStore {
    client: Client,
    ttl: Duration,
}

impl SqliteForecastStore {
    /// Opens (or creates) a store at `path` in WAL journal mode.
    pub async fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let ttl = validate_ttl(ttl)?;
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client, ttl })
    }

    /// Opens an in-memory store. Data is lost when the store is dropped.
    pub async fn open_in_memory(ttl: Duration) -> Result<Self> {
        let ttl = validate_ttl(ttl)?;
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client, ttl })
    }

    async fn init_schema(client: &Client) -> Result<()> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS forecasts (
                        key TEXT PRIMARY KEY,
                        payload TEXT NOT NULL,
                        fetched_at INTEGER NOT NULL,
                        expires_at INTEGER NOT NULL
                    )",
                    [],
                )?;
                conn.execute(
                    "CREATE INDEX IF NOT EXISTS idx_forecasts_expires_at ON forecasts(expires_at)",
                    [],
                )?;
                conn.execute(
                    "CREATE INDEX IF NOT EXISTS idx_forecasts_fetched_at ON forecasts(fetched_at)",
                    [],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

fn to_nanos(at: DateTime<Utc>) -> Result<i64> {
    at.timestamp_nanos_opt().ok_or_else(|| {
        CacheError::StoreUnavailable(format!("Timestamp outside storable range: {}", at))
    })
}

fn from_nanos(ns: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(ns)
}

#[async_trait]
impl ForecastStore for SqliteForecastStore {
    async fn get(&self, key: &ForecastKey) -> Result<Option<ForecastCacheEntry>> {
        let key_text = key.to_string();

        let row = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT payload, fetched_at, expires_at FROM forecasts WHERE key = ?",
                    [key_text],
                    |row| {
                        let payload: String = row.get(0)?;
                        let fetched_at: i64 = row.get(1)?;
                        let expires_at: i64 = row.get(2)?;
                        Ok((payload, fetched_at, expires_at))
                    },
                )
                .optional()
            })
            .await?;

        let Some((payload, fetched_at, expires_at)) = row else {
            return Ok(None);
        };

        let payload = serde_json::from_str(&payload)
            .map_err(|e| CacheError::StoreUnavailable(format!("Corrupt payload for {}: {}", key, e)))?;

        Ok(Some(ForecastCacheEntry {
            key: key.clone(),
            payload,
            fetched_at: from_nanos(fetched_at),
            expires_at: from_nanos(expires_at),
        }))
    }

    async fn put(
        &self,
        key: &ForecastKey,
        payload: ForecastPayload,
        fetched_at: DateTime<Utc>,
    ) -> Result<ForecastCacheEntry> {
        let entry = ForecastCacheEntry::new(key.clone(), payload, fetched_at, self.ttl)?;

        let key_text = key.to_string();
        let payload_text = serde_json::to_string(&entry.payload)
            .map_err(|e| CacheError::StoreUnavailable(e.to_string()))?;
        let fetched_ns = to_nanos(entry.fetched_at)?;
        let expires_ns = to_nanos(entry.expires_at)?;

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO forecasts (key, payload, fetched_at, expires_at)
                     VALUES (?, ?, ?, ?)",
                    rusqlite::params![key_text, payload_text, fetched_ns, expires_ns],
                )
            })
            .await?;

        Ok(entry)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let now_ns = to_nanos(now)?;

        let removed = self
            .client
            .conn(move |conn| conn.execute("DELETE FROM forecasts WHERE expires_at <= ?", [now_ns]))
            .await?;
        Ok(removed)
    }

    async fn scan_stats(&self, now: DateTime<Utc>) -> Result<StoreSnapshot> {
        let now_ns = to_nanos(now)?;

        let (total, expired, oldest, newest) = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*),
                            COALESCE(SUM(CASE WHEN expires_at <= ?1 THEN 1 ELSE 0 END), 0),
                            MIN(fetched_at),
                            MAX(fetched_at)
                     FROM forecasts",
                    [now_ns],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, Option<i64>>(2)?,
                            row.get::<_, Option<i64>>(3)?,
                        ))
                    },
                )
            })
            .await?;

        Ok(StoreSnapshot {
            total: total as usize,
            expired: expired as usize,
            oldest_fetched_at: oldest.map(from_nanos),
            newest_fetched_at: newest.map(from_nanos),
        })
    }

    async fn evict_oldest(&self, max_entries: usize) -> Result<usize> {
        let max_entries = i64::try_from(max_entries).unwrap_or(i64::MAX);

        let removed = self
            .client
            .conn(move |conn| {
                let total: i64 =
                    conn.query_row("SELECT COUNT(*) FROM forecasts", [], |row| row.get(0))?;
                let excess = total - max_entries;
                // A negative LIMIT means "no limit" in SQLite
                if excess <= 0 {
                    return Ok(0);
                }
                conn.execute(
                    "DELETE FROM forecasts WHERE key IN (
                        SELECT key FROM forecasts ORDER BY fetched_at ASC LIMIT ?
                    )",
                    [excess],
                )
            })
            .await?;

        if removed > 0 {
            debug!("Evicted {} oldest forecasts over capacity", removed);
        }
        Ok(removed)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
