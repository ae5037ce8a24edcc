//! Serde helpers and text parsers for platform payloads and sheet cells.
//!
//! Identifiers arrive as JSON strings or numbers depending on how the
//! institution loaded them, and sheet cells use several date layouts. These
//! helpers turn both into canonical values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::roster::normalize_identifier;

/// Deserialize an identifier that may be a string or a number into its
/// canonical string form. `null` and blank strings become `None`.
pub fn deserialize_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    let raw = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected string or number identifier, got {other}"
            )))
        }
    };
    let normalized = normalize_identifier(&raw);
    Ok(Some(normalized).filter(|s| !s.is_empty()))
}

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Parses a sheet date. Accepts `YYYY-MM-DD`, `DD/MM/YYYY`, and a datetime whose
/// time part is ignored (spreadsheet exports often append `00:00:00`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

/// Parses a sheet time. Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Parses a full datetime with a space or `T` separator, with or without seconds.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses a column label that names a moment: a datetime, or a bare date.
///
/// Returns the date and, when present, the time of day.
pub fn parse_moment(s: &str) -> Option<(NaiveDate, Option<NaiveTime>)> {
    if let Some(dt) = parse_datetime(s) {
        return Some((dt.date(), Some(dt.time())));
    }
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
        .map(|d| (d, None))
}
