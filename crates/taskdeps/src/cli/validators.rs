//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::{MAX_LAG_HOURS, MAX_TITLE_LENGTH, Metadata};
use chrono::{DateTime, NaiveDate, Utc};

/// Validate title length.
///
/// Title must be non-empty and not exceed MAX_TITLE_LENGTH (200 characters).
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    if s.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters (got {})",
            s.chars().count()
        ));
    }

    Ok(s.to_string())
}

/// Validate a lag in hours.
///
/// Accepts signed integers within ±MAX_LAG_HOURS. Negative values are lead time.
pub fn validate_lag(s: &str) -> Result<i32, String> {
    let lag: i32 = s
        .trim()
        .parse()
        .map_err(|_| format!("Lag must be a whole number of hours, got '{s}'"))?;

    if lag.unsigned_abs() > MAX_LAG_HOURS.unsigned_abs() {
        return Err(format!("Lag must be within ±{MAX_LAG_HOURS} hours"));
    }

    Ok(lag)
}

/// Parse a timestamp.
///
/// Accepts RFC 3339 (`2025-03-01T09:00:00Z`) or a bare date (`2025-03-01`),
/// which is taken as midnight UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("Invalid date '{s}'. Expected RFC 3339 or YYYY-MM-DD"))
}

/// Parse a metadata argument as a JSON object.
pub fn parse_metadata(s: &str) -> Result<Metadata, String> {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err("Metadata must be a JSON object".to_string()),
        Err(e) => Err(format!("Invalid metadata JSON: {e}")),
    }
}
