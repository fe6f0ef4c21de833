use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::error::{MeterError, Result};

/// Timestamp formats accepted on readings, in match order.
///
/// Storage writes `"%Y-%m-%d %H:%M"`; the seconds-bearing variant is
/// accepted for collections produced by older exports.
const FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse a reading timestamp into a naive datetime.
///
/// Returns `None` (and logs a warning) for empty strings or anything that
/// matches no recognised format. A single bad record must not abort
/// aggregation for the whole set, so this path never errors.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    warn!("could not parse reading timestamp \"{}\"", s);
    None
}

/// Calendar date of a reading timestamp, or `None` if it fails to parse.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_timestamp(s).map(|dt| dt.date())
}

/// Error-typed variant of [`parse_timestamp`] for callers that must reject
/// malformed input outright (e.g. validating a new entry before storage).
pub fn try_parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    parse_timestamp(s).ok_or_else(|| MeterError::TimestampParse(s.to_string()))
}
