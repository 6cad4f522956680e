use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::ValidationError;

/// A wall-clock timestamp with second precision. No timezone is attached;
/// callers decide what the wall clock means.
pub type Timestamp = NaiveDateTime;

/// Canonical storage format. Fixed width, so lexical order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const ACCEPTED_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 style timestamp. Seconds are optional (date-time pickers
/// commonly omit them) and default to zero; fractional seconds are dropped.
pub fn parse_timestamp(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(truncate_to_seconds)
        })
}

/// Parse a timestamp for a named field, mapping failures into a `ValidationError`.
pub fn parse_timestamp_field(
    field: &'static str,
    input: &str,
) -> Result<Timestamp, ValidationError> {
    parse_timestamp(input).ok_or_else(|| {
        ValidationError::wrong_type(field, input, "expected YYYY-MM-DDTHH:MM[:SS]")
    })
}

pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn truncate_to_seconds(ts: Timestamp) -> Timestamp {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// First second of the given day.
pub fn start_of_day(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN)
}

/// Last second of the given day (23:59:59).
pub fn end_of_day(date: NaiveDate) -> Timestamp {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}
