//! Time handling for observation queries.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A closed time interval. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeInterval {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Interval built from optional bounds; `None` if both are missing.
    pub fn from_bounds(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<Self> {
        if start.is_none() && end.is_none() {
            None
        } else {
            Some(Self { start, end })
        }
    }

    /// Parse a `timespan` parameter.
    ///
    /// Supports:
    /// - Range: "2024-01-15T00:00:00Z/2024-01-16T00:00:00Z"
    /// - Open range: "../2024-01-16T00:00:00Z" or "2024-01-15T00:00:00Z/.."
    /// - Single instant: "2024-01-15T12:00:00Z"
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let s = s.trim();
        if let Some((start, end)) = s.split_once('/') {
            let start = parse_bound(start)?;
            let end = parse_bound(end)?;
            if let (Some(a), Some(b)) = (start, end) {
                if a > b {
                    return Err(TimeParseError::InvertedInterval(s.to_string()));
                }
            }
            return Ok(Self { start, end });
        }

        let instant = parse_iso8601(s)?;
        Ok(Self::new(instant, instant))
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| dt >= &start) && self.end.map_or(true, |end| dt <= &end)
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fmt_bound = |b: &Option<DateTime<Utc>>| {
            b.map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| "..".to_string())
        };
        write!(f, "{}/{}", fmt_bound(&self.start), fmt_bound(&self.end))
    }
}

fn parse_bound(s: &str) -> Result<Option<DateTime<Utc>>, TimeParseError> {
    let s = s.trim();
    if s.is_empty() || s == ".." {
        return Ok(None);
    }
    parse_iso8601(s).map(Some)
}

/// Parse an ISO 8601 timestamp, assuming UTC when no offset is given.
pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    // Try full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try without timezone (assume UTC)
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    // Try date only
    if let Ok(ndt) = NaiveDateTime::parse_from_str(&format!("{}T00:00:00", s), "%Y-%m-%dT%H:%M:%S")
    {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Interval start is after its end: {0}")]
    InvertedInterval(String),
}
