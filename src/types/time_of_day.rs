use std::time::Duration;

use chrono::{NaiveTime, Timelike};

/// `%H` also takes a single digit, so this covers `HH:MM:SS` and `H:MM:SS`.
const TIME_FORMAT: &str = "%H:%M:%S";

/// Parses `HH:MM:SS` or `H:MM:SS`. Anything else is `None`, which leaves
/// the field it was meant for untouched.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).ok()
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Tolerances are written as a time of day, so they top out at 23:59:59.
pub fn parse_tolerance(raw: &str) -> Option<Duration> {
    parse_time_of_day(raw).map(|time| Duration::from_secs(time.num_seconds_from_midnight() as u64))
}

pub fn format_tolerance(tolerance: Duration) -> String {
    let total = tolerance.as_secs();
    let hours = (total / 3600).min(99);
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
