use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Placeholder shown for a missing date or statistic.
pub const EMPTY_LABEL: &str = "—";

const LABEL_FORMAT: &str = "%d/%m/%Y";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Parse a timestamp in any of the shapes the backend emits.
///
/// Accepts:
/// - RFC3339 (`2024-03-01T10:00:00Z`, `2024-03-01T10:00:00-03:00`)
/// - Naive datetime with `T` or space separator, optional fraction (taken as UTC)
/// - YYYY-MM-DD (midnight UTC)
/// - RFC2822
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// Calendar date of a timestamp string, as written (no timezone shift).
fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, LABEL_FORMAT) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.date());
        }
    }
    DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.date_naive())
}

/// Display label `dd/mm/YYYY` for a date string.
///
/// Missing or blank input yields [`EMPTY_LABEL`]; input that does not parse is
/// returned unchanged.
pub fn format_date_label(value: Option<&str>) -> String {
    let Some(raw) = value.filter(|s| !s.trim().is_empty()) else {
        return EMPTY_LABEL.to_string();
    };
    match parse_calendar_date(raw.trim()) {
        Some(d) => d.format(LABEL_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

pub fn today_label() -> String {
    chrono::Local::now().date_naive().format(LABEL_FORMAT).to_string()
}

/// Today as `YYYY-MM-DD` in UTC.
pub fn today_iso() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
