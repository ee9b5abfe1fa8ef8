//! Client capture times are advisory. A value that cannot be read is replaced
//! by the ingestion time rather than failing the request, so this module
//! returns a default instead of an error.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, SubsecRound, Utc,
};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    // RFC 3339 needs seconds; a trailing `Z` without them is still UTC.
    "%Y-%m-%dT%H:%MZ",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Resolve a client-supplied capture time.
///
/// Absent, blank and unparseable values resolve to `now`. The result is
/// truncated to microseconds, the precision the store keeps.
pub fn resolve_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(parse_client_timestamp)
        .unwrap_or(now)
        .trunc_subsecs(6)
}

/// Parse an ISO 8601 timestamp.
///
/// Offsets are honored (`Z` is the UTC designator); naive values and bare
/// dates are taken as UTC.
pub fn parse_client_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(parsed) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::<FixedOffset>::parse_from_str(raw, fmt).ok())
    {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
