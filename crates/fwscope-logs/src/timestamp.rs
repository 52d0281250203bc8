use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use fwscope_types::FirewallLog;

/// Date-time layouts accepted when the string carries no offset
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-time layouts with a numeric offset that RFC 3339 doesn't cover
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Parse an ISO-8601 timestamp string
///
/// Accepts RFC 3339, date-times with minute precision, date-times without
/// an offset (read as UTC), bare dates (UTC midnight), and the reduced
/// `YYYY-MM` and `YYYY` forms (first day of the month or year).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    // A trailing `Z` is UTC, same as no offset at all
    let naive = raw.strip_suffix(['Z', 'z']).unwrap_or(raw);
    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(ts.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .or_else(|| reduced_date(naive))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// `YYYY-MM` or `YYYY`
fn reduced_date(raw: &str) -> Option<NaiveDate> {
    let (year, month) = raw.split_once('-').unwrap_or((raw, "01"));
    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(year, 4) || !digits(month, 2) {
        return None;
    }

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Ordering key for a record: milliseconds since the Unix epoch
///
/// A `__timestamp__` sent as a JSON number is already in milliseconds.
/// Missing or unparseable timestamps count as the epoch itself.
pub fn sort_key(log: &FirewallLog) -> i64 {
    log.timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .map(|ts| ts.timestamp_millis())
        .or_else(|| log.extra.get("__timestamp__").and_then(Value::as_i64))
        .unwrap_or(0)
}
