use chrono::NaiveTime;

use crate::types::trading_day::TradingDay;

pub const MAX_BREAKS: usize = 3;

/// A single weekly open interval. `end` may fall before `start` in weekly
/// order, in which case the session runs into the following week.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start_day: TradingDay,
    pub start_time: NaiveTime,
    pub end_day: TradingDay,
    pub end_time: NaiveTime,
}

impl ScheduleWindow {
    pub fn new(
        start_day: TradingDay,
        start_time: NaiveTime,
        end_day: TradingDay,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            start_day,
            start_time,
            end_day,
            end_time,
        }
    }

    pub fn wraps_week(&self) -> bool {
        let start = self.start_day.offset();
        let end = self.end_day.offset();

        end < start || (end == start && self.end_time < self.start_time)
    }
}

impl Default for ScheduleWindow {
    fn default() -> Self {
        Self::new(TradingDay::Mon, NaiveTime::MIN, TradingDay::Mon, NaiveTime::MIN)
    }
}

/// Intraday pause evaluated against the current calendar day.
///
/// `00:00:00 -> 00:00:00` is the disabled sentinel; there is no separate flag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BreakWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BreakWindow {
    pub const DISABLED: BreakWindow = BreakWindow {
        start: NaiveTime::MIN,
        end: NaiveTime::MIN,
    };

    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn is_disabled(&self) -> bool {
        self.start == NaiveTime::MIN && self.end == NaiveTime::MIN
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }
}

impl Default for BreakWindow {
    fn default() -> Self {
        Self::DISABLED
    }
}
