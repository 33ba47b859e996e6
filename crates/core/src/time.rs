//! Calendar arithmetic shared by booking and availability.
//!
//! All timestamps are UTC. An appointment occupies exactly one hour, identified
//! by the timestamp of that hour's start.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::errors::{AgendaError, AgendaResult};

/// Floors a timestamp to the start of its hour.
///
/// 10:59:59.999 becomes 10:00:00; it never rounds up to 11:00.
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    let into_hour = Duration::seconds(i64::from(ts.minute() * 60 + ts.second()))
        + Duration::nanoseconds(i64::from(ts.nanosecond()));
    ts - into_hour
}

/// Midnight at the start of `day`.
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Half-open `[start, end)` bounds covering `day`.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(day);
    (start, start + Duration::days(1))
}

/// Parses a requested day.
///
/// Accepts epoch milliseconds, `YYYY-MM-DD` and RFC 3339 timestamps.
pub fn parse_day(raw: Option<&str>) -> AgendaResult<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AgendaError::InvalidInput("Specify a correct date".to_string()))?;

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .map(|ts| ts.date_naive())
            .ok_or_else(|| AgendaError::InvalidInput(format!("Invalid date '{raw}'")));
    }

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .map_err(|_| AgendaError::InvalidInput(format!("Invalid date '{raw}'")))
}

/// Parses a requested booking timestamp.
///
/// Accepts RFC 3339, and ISO 8601 date-times or dates without an offset,
/// which are read as UTC.
pub fn parse_timestamp(raw: &str) -> AgendaResult<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.and_utc());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M") {
        return Ok(ts.and_utc());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(start_of_day)
        .map_err(|_| AgendaError::InvalidInput(format!("Invalid date '{raw}'")))
}
