use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::types::schedule::{BreakWindow, MAX_BREAKS, ScheduleWindow};

pub const DEFAULT_DIGITS: u32 = 5;

/// Display precision is capped here.
pub const MAX_DIGITS: u32 = 10;

#[derive(Clone, PartialEq)]
pub struct Instrument {
    symbol: String,
    digits: u32,
    group: String,
    stop_sound: String,
    resume_sound: String,
    tolerance: Duration,
    enabled: bool,
    schedule: ScheduleWindow,
    breaks: [BreakWindow; MAX_BREAKS],
}

impl Instrument {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().trim().to_string(),
            digits: DEFAULT_DIGITS,
            group: String::new(),
            stop_sound: String::new(),
            resume_sound: String::new(),
            tolerance: Duration::ZERO,
            enabled: true,
            schedule: ScheduleWindow::default(),
            breaks: [BreakWindow::DISABLED; MAX_BREAKS],
        }
    }

    pub fn with_sounds(
        symbol: impl Into<String>,
        stop_sound: impl Into<String>,
        resume_sound: impl Into<String>,
    ) -> Self {
        let mut instrument = Self::new(symbol);
        instrument.stop_sound = stop_sound.into().trim().to_string();
        instrument.resume_sound = resume_sound.into().trim().to_string();
        instrument
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn schedule(&self) -> &ScheduleWindow {
        &self.schedule
    }

    pub fn breaks(&self) -> &[BreakWindow; MAX_BREAKS] {
        &self.breaks
    }

    /// Raw configured value; blank means no sound.
    pub fn stop_sound_raw(&self) -> &str {
        &self.stop_sound
    }

    pub fn resume_sound_raw(&self) -> &str {
        &self.resume_sound
    }

    pub fn stop_sound(&self) -> Option<&Path> {
        non_blank_path(&self.stop_sound)
    }

    pub fn resume_sound(&self) -> Option<&Path> {
        non_blank_path(&self.resume_sound)
    }

    pub fn set_digits(&mut self, digits: u32) {
        self.digits = digits.min(MAX_DIGITS);
    }

    pub fn set_group(&mut self, group: impl Into<String>) {
        self.group = group.into();
    }

    pub fn set_tolerance(&mut self, tolerance: Duration) {
        self.tolerance = tolerance;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn schedule_mut(&mut self) -> &mut ScheduleWindow {
        &mut self.schedule
    }

    pub fn breaks_mut(&mut self) -> &mut [BreakWindow; MAX_BREAKS] {
        &mut self.breaks
    }

    /// Carries the schedule side of `previous` across a reload, and its
    /// digits unless this record brought its own.
    pub(crate) fn inherit_schedule(&mut self, previous: &Instrument) {
        self.group = previous.group.clone();
        self.schedule = previous.schedule;
        self.breaks = previous.breaks;
        if self.digits == DEFAULT_DIGITS {
            self.digits = previous.digits;
        }
    }
}

fn non_blank_path(raw: &str) -> Option<&Path> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(Path::new(raw))
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.symbol)
    }
}

impl fmt::Debug for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrument")
            .field("symbol", &self.symbol)
            .field("group", &self.group)
            .field("tolerance", &self.tolerance)
            .field("enabled", &self.enabled)
            .field("schedule", &self.schedule)
            .field("breaks", &self.breaks)
            .finish()
    }
}
