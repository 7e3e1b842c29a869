//! Calendar-date normalization for ledger cells.
//!
//! Stored dates arrive in whatever form the store last saw: plain
//! `YYYY-MM-DD`, a timestamp, or a spreadsheet serial day number. Everything
//! is reduced to a `NaiveDate` before comparison; string comparison of raw
//! cells is never used.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Canonical on-disk date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Normalize a raw date cell. Empty input yields `None`.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(d);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    serial_day(raw)
}

/// Spreadsheet serial day number (days since 1899-12-30).
fn serial_day(raw: &str) -> Option<NaiveDate> {
    let days: f64 = raw.parse().ok()?;
    // Serial numbers below this are not plausible calendar dates here.
    if !days.is_finite() || !(20_000.0..=200_000.0).contains(&days) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(days.trunc() as i64))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn plain_and_timestamp_forms() {
        assert_eq!(normalize_date("2026-01-26"), Some(ymd(2026, 1, 26)));
        assert_eq!(normalize_date("2026-01-26 15:30:00"), Some(ymd(2026, 1, 26)));
        assert_eq!(normalize_date("2026-01-26T09:00:00"), Some(ymd(2026, 1, 26)));
        assert_eq!(
            normalize_date("2026-01-26T09:00:00+00:00"),
            Some(ymd(2026, 1, 26))
        );
    }

    #[test]
    fn serial_day_number() {
        // 46048 = 2026-01-26 in spreadsheet serial days.
        assert_eq!(normalize_date("46048"), Some(ymd(2026, 1, 26)));
    }

    #[test]
    fn empty_and_garbage() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("  "), None);
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date("12"), None);
    }

    #[test]
    fn format_roundtrips() {
        assert_eq!(format_date(ymd(2026, 3, 5)), "2026-03-05");
    }
}
