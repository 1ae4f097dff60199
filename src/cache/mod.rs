//! Cache Module
//!
//! Forecast storage with TTL expiry, reclamation and statistics.

mod entry;
mod key;
mod memory;
mod sqlite;
mod stats;
mod store;


// Re-export public types
pub use entry::{ForecastCacheEntry, ForecastPayload};
pub use key::{normalize_location, ForecastKey};
pub use memory::MemoryForecastStore;
pub use sqlite::SqliteForecastStore;
pub use stats::{is_expired_at, CacheStatistics, StoreSnapshot};
pub use store::ForecastStore;

// == Public Constants ==
/// Maximum allowed normalized location length in bytes
pub const MAX_LOCATION_LENGTH: usize = 256;

/// Longest accepted forecast time-to-live, in hours (one year)
pub const MAX_TTL_HOURS: u64 = 24 * 365;
