//! Weekly trading calendar evaluation.
//!
//! Everything here works on the wall-clock reading of `now` in the monitoring
//! timezone. Both the weekly window and every break are inclusive on both
//! edges.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use crate::types::instrument::Instrument;
use crate::types::schedule::{BreakWindow, ScheduleWindow};

pub fn is_open(now: DateTime<Tz>, schedule: &ScheduleWindow, breaks: &[BreakWindow]) -> bool {
    is_open_at(now.naive_local(), schedule, breaks)
}

pub fn is_instrument_open(now: DateTime<Tz>, instrument: &Instrument) -> bool {
    is_open(now, instrument.schedule(), instrument.breaks())
}

pub fn is_open_at(now: NaiveDateTime, schedule: &ScheduleWindow, breaks: &[BreakWindow]) -> bool {
    within_window(now, schedule) && !in_any_break(now, breaks)
}

/// Anchored to the Monday of `now`'s own week only. A wrapping session's
/// tail in the following week is not open until the session starts again.
pub fn within_window(now: NaiveDateTime, schedule: &ScheduleWindow) -> bool {
    let week_start = week_start(now.date());

    let start = at(week_start, schedule.start_day.offset() as u64, schedule.start_time);
    let mut end = at(week_start, schedule.end_day.offset() as u64, schedule.end_time);
    if schedule.wraps_week() {
        end = end.and_then(|end| end.checked_add_days(Days::new(7)));
    }

    match (start, end) {
        (Some(start), Some(end)) => start <= now && now <= end,
        _ => false,
    }
}

pub fn in_any_break(now: NaiveDateTime, breaks: &[BreakWindow]) -> bool {
    breaks
        .iter()
        .filter(|window| !window.is_disabled())
        .any(|window| in_break(now, window))
}

pub fn in_break(now: NaiveDateTime, window: &BreakWindow) -> bool {
    let today = now.date();

    if in_break_anchored(now, window, Some(today)) {
        return true;
    }

    /* yesterday's break spilling past midnight into today */
    window.crosses_midnight() && in_break_anchored(now, window, today.checked_sub_days(Days::new(1)))
}

/// Monday of the week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    let since_monday = date.weekday().num_days_from_monday() as u64;

    date.checked_sub_days(Days::new(since_monday)).unwrap_or(date)
}

fn in_break_anchored(now: NaiveDateTime, window: &BreakWindow, day: Option<NaiveDate>) -> bool {
    let Some(day) = day else {
        return false;
    };

    let start = day.and_time(window.start);
    let end = if window.crosses_midnight() {
        at(day, 1, window.end)
    } else {
        Some(day.and_time(window.end))
    };

    match end {
        Some(end) => start <= now && now <= end,
        None => false,
    }
}

fn at(day: NaiveDate, offset_days: u64, time: NaiveTime) -> Option<NaiveDateTime> {
    day.checked_add_days(Days::new(offset_days))
        .map(|date| date.and_time(time))
}
