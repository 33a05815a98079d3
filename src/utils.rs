// Utility functions
use chrono::{DateTime, Datelike, Local, Months, NaiveDate, Utc};

/// Parses a canonical `YYYY-MM-DD` date, if possible.
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

/// Formats a date as the canonical join key.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Calendar-month subtraction. The day is clamped to the end of the target
/// month (2026-03-31 minus one month is 2026-02-28).
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// Converts a unix timestamp (seconds) to a UTC canonical date.
pub fn date_from_unix(seconds: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|dt| format_date(dt.date_naive()))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
