//! Aggregates derived from fetched collections.
//!
//! Every computation takes an explicit `now` so results are reproducible;
//! handlers pass `Utc::now()`. All buckets are UTC.

pub mod activity;
pub mod analytics;
pub mod dashboard;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

/// Look-back window for "recent" activity and the daily growth series.
pub const ACTIVITY_WINDOW_DAYS: i64 = 30;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(ACTIVITY_WINDOW_DAYS)
}

/// Midnight UTC of the day containing `at`.
pub fn day_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Calendar month `back` months before the one containing `now`, as (year, month 1-12).
pub fn months_back(now: DateTime<Utc>, back: u32) -> (i32, u32) {
    let index = now.year() * 12 + now.month0() as i32 - back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

pub fn in_month(at: DateTime<Utc>, (year, month): (i32, u32)) -> bool {
    at.year() == year && at.month() == month
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month.clamp(1, 12) - 1) as usize]
}

/// Share of `part` in `whole` as a percentage, 0 for an empty whole.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
