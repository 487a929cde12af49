//! Row parsing and timestamp encoding helpers.
//!
//! Audit timestamps are stored as RFC 3339 UTC text with fixed microsecond
//! precision (`2026-02-09T14:30:00.000000Z`). Fixed width keeps lexical order
//! equal to chronological order, so window predicates are plain `>=` / `<=`
//! on the TEXT column.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::DatabaseError;

/// Encode a timestamp for storage.
#[must_use]
pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// Also accepts `SQLite`'s default `datetime('now')` format
/// (`2026-02-09 14:30:00`) for rows written by hand.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a `YYYY-MM-DD` column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string is not a valid date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}")))
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Read a nullable TEXT column.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, so nullable
/// columns go through `Option<String>`. Unlike catalog columns, an empty
/// audit value is a real value and is kept.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    Ok(row.get::<Option<String>>(idx)?)
}

/// Parse an id carried as text in an audit value.
#[must_use]
pub fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}
