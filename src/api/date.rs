use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Timelike};
use serde::Serializer;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 timestamp. Offsets are normalized to UTC; a bare date means midnight.
/// Fractions are truncated to microseconds, the precision of a Postgres `TIMESTAMP`.
pub fn parse_iso8601(raw: &str) -> Option<NaiveDateTime> {
    parse_any(raw.trim()).map(|parsed| parsed.trunc_subsecs(6))
}

fn parse_any(raw: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// `YYYY-MM-DDTHH:MM:SS`, with microseconds only when present.
pub fn format_iso8601(value: &NaiveDateTime) -> String {
    if value.nanosecond() == 0 {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_iso8601(value))
}
