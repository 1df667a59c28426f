//! Timestamp utilities
//!
//! Timestamps are stored in the database as RFC 3339 TEXT columns and
//! parsed back to `DateTime<Utc>` when rows are loaded.

use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for TEXT column storage
pub fn to_column(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Parse a TEXT column back into a UTC timestamp
pub fn from_column(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp '{}': {}", raw, e)))
}

/// Parse an optional TEXT column back into an optional UTC timestamp
pub fn from_column_opt(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(from_column).transpose()
}
