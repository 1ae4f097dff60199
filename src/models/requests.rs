//! Request DTOs for the forecast cache API
//!
//! Defines the query strings accepted by the HTTP endpoints.

use serde::Deserialize;

/// Query for the cache status endpoint (GET /cache/status)
///
/// # Fields
/// - `stats`: include statistics (default true)
/// - `cleanup`: run and report a cleanup pass (default false)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub stats: Option<bool>,
    #[serde(default)]
    pub cleanup: Option<bool>,
}

impl StatusQuery {
    /// Statistics are reported unless explicitly suppressed.
    pub fn include_stats(&self) -> bool {
        self.stats.unwrap_or(true)
    }

    /// Cleanup runs only when explicitly requested.
    pub fn run_cleanup(&self) -> bool {
        self.cleanup.unwrap_or(false)
    }
}

/// Query for the forecast endpoint (GET /forecast/:location/:date)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastQuery {
    /// Optional forecast horizon in days
    #[serde(default)]
    pub day_offset: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_query_defaults() {
        let query: StatusQuery = serde_json::from_str("{}").unwrap();
        assert!(query.include_stats());
        assert!(!query.run_cleanup());
    }

    #[test]
    fn test_status_query_flags() {
        let query: StatusQuery =
            serde_json::from_str(r#"{"stats": false, "cleanup": true}"#).unwrap();
        assert!(!query.include_stats());
        assert!(query.run_cleanup());
    }

    #[test]
    fn test_forecast_query_day_offset() {
        let query: ForecastQuery = serde_json::from_str(r#"{"dayOffset": 3}"#).unwrap();
        assert_eq!(query.day_offset, Some(3));

        let query: ForecastQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.day_offset, None);
    }
}
