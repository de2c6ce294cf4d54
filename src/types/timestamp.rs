use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Milliseconds in one day; also the cross-rate match tolerance.
pub const DAY_MS: i64 = 86_400_000;

// Offset-carrying layouts, tried after strict RFC 3339. A trailing `Z` is
// rewritten to `+00:00` first.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

// Offset-less layouts, read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Instant denoted by an ISO-8601 style date or datetime string.
///
/// Accepts `T` or a space between date and time, `Z`, `+hh:mm` or `+hhmm`
/// offsets, optional seconds and fractions. Values without an offset and
/// plain `YYYY-MM-DD` dates (midnight) are taken as UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }

    let normalized = normalize(value);

    for format in OFFSET_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(&normalized, format) {
            return Some(instant.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn normalize(value: &str) -> String {
    let mut normalized = value.to_string();
    if normalized.as_bytes().get(10) == Some(&b' ') {
        normalized.replace_range(10..11, "T");
    }
    if normalized.ends_with(['Z', 'z']) {
        normalized.pop();
        normalized.push_str("+00:00");
    }
    normalized
}

/// UTC calendar date of an ISO-8601 date or datetime string.
pub fn calendar_date(value: &str) -> Option<NaiveDate> {
    parse_instant(value).map(|instant| instant.date_naive())
}

/// Date-only equality. Unparseable values never match.
pub fn same_calendar_day(a: &str, b: &str) -> bool {
    match (calendar_date(a), calendar_date(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Epoch milliseconds of the instant a date string denotes (midnight UTC for plain dates).
pub fn instant_ms(value: &str) -> Option<i64> {
    parse_instant(value).map(|instant| instant.timestamp_millis())
}

/// ISO-8601 instant with millisecond precision and a `Z` suffix.
pub fn iso_instant(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn epoch_date() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}
