//! Forecast Key Module
//!
//! Builds canonical cache keys from location strings and target dates.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::cache::MAX_LOCATION_LENGTH;
use crate::error::{CacheError, Result};

/// Separator between key components in the canonical text form.
const KEY_SEPARATOR: char = '|';

// == Forecast Key ==
/// Identifies one cached forecast slot.
///
/// The canonical text form is `location|YYYY-MM-DD`, with `|+N` appended
/// when a day offset is present. Stores use that text as the row key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastKey {
    location: String,
    date: NaiveDate,
    day_offset: Option<u32>,
}

impl ForecastKey {
    // == Constructor ==
    /// Creates a key, normalizing the location first.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the location is empty after normalization,
    /// too long, or contains the key separator.
    pub fn new(location: &str, date: NaiveDate, day_offset: Option<u32>) -> Result<Self> {
        let location = normalize_location(location);

        if location.is_empty() {
            return Err(CacheError::InvalidRequest(
                "Location cannot be empty".to_string(),
            ));
        }
        if location.len() > MAX_LOCATION_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Location exceeds maximum length of {} bytes",
                MAX_LOCATION_LENGTH
            )));
        }
        if location.contains(KEY_SEPARATOR) {
            return Err(CacheError::InvalidRequest(format!(
                "Location cannot contain '{}'",
                KEY_SEPARATOR
            )));
        }

        Ok(Self {
            location,
            date,
            day_offset,
        })
    }

    /// Normalized location identifier.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Forecast target date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Forecast horizon in days, if any.
    pub fn day_offset(&self) -> Option<u32> {
        self.day_offset
    }
}

impl fmt::Display for ForecastKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.location, KEY_SEPARATOR, self.date)?;
        if let Some(offset) = self.day_offset {
            write!(f, "{}+{}", KEY_SEPARATOR, offset)?;
        }
        Ok(())
    }
}

impl FromStr for ForecastKey {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CacheError::InvalidRequest(format!("Malformed forecast key: {}", s));

        let mut parts = s.split(KEY_SEPARATOR);
        let location = parts.next().ok_or_else(invalid)?;
        let date = parts
            .next()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(invalid)?;
        let day_offset = match parts.next() {
            Some(offset) => Some(
                offset
                    .strip_prefix('+')
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(invalid)?,
            ),
            None => None,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Self::new(location, date, day_offset)
    }
}

// == Normalization ==
/// Canonicalizes a location string.
///
/// Trims, lowercases, and collapses internal whitespace runs to one space,
/// so `"  New   York "` and `"new york"` map to the same key.
pub fn normalize_location(location: &str) -> String {
    location
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
