//! Strict `DD/MM/YYYY` parsing and elapsed-day arithmetic for date branches

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").expect("date pattern is valid"));

const SECONDS_PER_DAY: i64 = 86_400;

/// Parse a zero-padded `DD/MM/YYYY` date that exists on the calendar
pub fn parse_strict_date(literal: &str) -> Option<NaiveDate> {
    let caps = DATE_SHAPE.captures(literal)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whole days from midnight of `date` to `now`, rounded up.
/// Future dates give zero or a negative count.
pub fn elapsed_days(date: NaiveDate, now: NaiveDateTime) -> i64 {
    let seconds = (now - date.and_time(NaiveTime::MIN)).num_seconds();
    -(-seconds).div_euclid(SECONDS_PER_DAY)
}
