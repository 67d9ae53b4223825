//! Calendar-day arithmetic.
//!
//! All scheduling works on plain calendar dates (year-month-day). Routing
//! a date through a timestamp or UTC conversion can shift the day near
//! midnight or across a DST change, so every helper here stays on
//! `NaiveDate` and computes purely on date fields.

use chrono::{Duration, Local, NaiveDate};

/// The current calendar date in the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The calendar date `n` days after `date` (`n` may be negative).
///
/// Saturates at the supported calendar range instead of wrapping.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let saturated = if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN };
    match Duration::try_days(n) {
        Some(delta) => date.checked_add_signed(delta).unwrap_or(saturated),
        None => saturated,
    }
}

/// `b - a` in whole days, signed.
///
/// Positive when `b` is later. The sign carries "overdue vs. upcoming"
/// meaning to callers, so this never takes an absolute value.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

/// Whether `date` falls on or before `reference`. Used to test due-ness.
pub fn is_on_or_before(date: NaiveDate, reference: NaiveDate) -> bool {
    date <= reference
}

/// Parse an ISO `YYYY-MM-DD` string. No time-zone offset is applied.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
}

/// Format a date as ISO `YYYY-MM-DD`, the form used in store keys.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
