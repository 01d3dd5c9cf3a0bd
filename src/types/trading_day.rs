use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TradingDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl TradingDay {
    pub const ALL: [TradingDay; 7] = [
        TradingDay::Mon,
        TradingDay::Tue,
        TradingDay::Wed,
        TradingDay::Thu,
        TradingDay::Fri,
        TradingDay::Sat,
        TradingDay::Sun,
    ];

    /// Days since Monday, 0..=6.
    pub fn offset(self) -> i64 {
        self as i64
    }

    pub fn name(self, names: DayNames) -> &'static str {
        let index = self as usize;
        match names {
            DayNames::English => ENGLISH_NAMES[index],
            DayNames::Chinese => CHINESE_NAMES[index],
        }
    }
}

const ENGLISH_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const ENGLISH_LONG_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const CHINESE_NAMES: [&str; 7] = [
    "星期一",
    "星期二",
    "星期三",
    "星期四",
    "星期五",
    "星期六",
    "星期日",
];

impl From<Weekday> for TradingDay {
    fn from(weekday: Weekday) -> Self {
        TradingDay::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl FromStr for TradingDay {
    type Err = anyhow::Error;

    /// Accepts every locale the parameter files have been written in.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let position = ENGLISH_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(trimmed))
            .or_else(|| {
                ENGLISH_LONG_NAMES
                    .iter()
                    .position(|name| name.eq_ignore_ascii_case(trimmed))
            })
            .or_else(|| CHINESE_NAMES.iter().position(|name| *name == trimmed));

        position
            .map(|index| TradingDay::ALL[index])
            .ok_or_else(|| anyhow!("unknown day name: {trimmed}"))
    }
}

impl fmt::Display for TradingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(DayNames::English))
    }
}

/// Locale used when writing day names back to parameter files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayNames {
    #[default]
    English,
    Chinese,
}
