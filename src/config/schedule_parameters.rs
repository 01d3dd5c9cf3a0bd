//! Named parameter sets: one 13-field row per instrument after a header row.
//!
//! `symbol, tolerance, group, startDay, startTime, endDay, endTime,
//! break1Start, break1End, break2Start, break2End, break3Start, break3End`

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use tracing::{debug, warn};

use crate::types::instrument::Instrument;
use crate::types::schedule::MAX_BREAKS;
use crate::types::time_of_day::{format_time_of_day, format_tolerance, parse_time_of_day, parse_tolerance};
use crate::types::trading_day::{DayNames, TradingDay};

pub const FIELD_COUNT: usize = 13;

pub const HEADER: [&str; FIELD_COUNT] = [
    "Symbol",
    "Tolerance",
    "Group",
    "StartDay",
    "StartTime",
    "EndDay",
    "EndTime",
    "Break1Start",
    "Break1End",
    "Break2Start",
    "Break2End",
    "Break3Start",
    "Break3End",
];

/// One parsed row. A `None` field failed to parse and leaves the
/// instrument's current value in place when applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRow {
    pub symbol: String,
    pub tolerance: Option<Duration>,
    pub group: String,
    pub start_day: Option<TradingDay>,
    pub start_time: Option<NaiveTime>,
    pub end_day: Option<TradingDay>,
    pub end_time: Option<NaiveTime>,
    pub break_times: [Option<NaiveTime>; MAX_BREAKS * 2],
}

impl ParameterRow {
    pub fn from_fields(fields: &[&str]) -> Option<Self> {
        if fields.len() < FIELD_COUNT {
            return None;
        }

        let symbol = fields[0].trim();
        if symbol.is_empty() {
            return None;
        }

        let mut break_times = [None; MAX_BREAKS * 2];
        for (slot, raw) in break_times.iter_mut().zip(&fields[7..FIELD_COUNT]) {
            *slot = parse_time_of_day(raw);
        }

        Some(Self {
            symbol: symbol.to_string(),
            tolerance: parse_tolerance(fields[1]),
            group: fields[2].to_string(),
            start_day: fields[3].parse().ok(),
            start_time: parse_time_of_day(fields[4]),
            end_day: fields[5].parse().ok(),
            end_time: parse_time_of_day(fields[6]),
            break_times,
        })
    }

    /// Overwrites tolerance, group, schedule and breaks, field by field.
    pub fn apply_to(&self, instrument: &mut Instrument) {
        if let Some(tolerance) = self.tolerance {
            instrument.set_tolerance(tolerance);
        }
        instrument.set_group(self.group.clone());

        let schedule = instrument.schedule_mut();
        if let Some(day) = self.start_day {
            schedule.start_day = day;
        }
        if let Some(time) = self.start_time {
            schedule.start_time = time;
        }
        if let Some(day) = self.end_day {
            schedule.end_day = day;
        }
        if let Some(time) = self.end_time {
            schedule.end_time = time;
        }

        for (window, times) in instrument.breaks_mut().iter_mut().zip(self.break_times.chunks(2)) {
            if let Some(start) = times[0] {
                window.start = start;
            }
            if let Some(end) = times[1] {
                window.end = end;
            }
        }
    }
}

pub fn read_parameter_rows(path: &Path) -> Result<Vec<ParameterRow>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read schedule parameters {}", path.display()))?;

    Ok(parse_parameter_rows(&raw))
}

/// The first row is a header and is always skipped.
pub fn parse_parameter_rows(raw: &str) -> Vec<ParameterRow> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(error) => {
                warn!(row = index + 2, "skipping unreadable parameter row: {error}");
                continue;
            }
        };

        let fields: Vec<&str> = record.iter().collect();
        match ParameterRow::from_fields(&fields) {
            Some(row) => rows.push(row),
            None => debug!(row = index + 2, fields = fields.len(), "skipping short parameter row"),
        }
    }

    rows
}

pub fn write_parameters(path: &Path, instruments: &[Instrument], day_names: DayNames) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for instrument in instruments {
        let schedule = instrument.schedule();
        let mut record = vec![
            instrument.symbol().to_string(),
            format_tolerance(instrument.tolerance()),
            instrument.group().to_string(),
            schedule.start_day.name(day_names).to_string(),
            format_time_of_day(schedule.start_time),
            schedule.end_day.name(day_names).to_string(),
            format_time_of_day(schedule.end_time),
        ];
        for window in instrument.breaks() {
            record.push(format_time_of_day(window.start));
            record.push(format_time_of_day(window.end));
        }

        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().context("failed to encode schedule parameters")?;
    fs::write(path, bytes)
        .with_context(|| format!("failed to write schedule parameters {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::schedule::{BreakWindow, ScheduleWindow};

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    const GOLD_ROW: &str = "XAUUSD,0:00:30,Metals,Mon,7:00:00,Sat,05:00:00,05:00:00,06:00:00,00:00:00,00:00:00,00:00:00,00:00:00";

    #[test]
    fn parses_a_full_row() {
        let raw = format!("{}\n{GOLD_ROW}\n", HEADER.join(","));
        let rows = parse_parameter_rows(&raw);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.symbol, "XAUUSD");
        assert_eq!(row.tolerance, Some(Duration::from_secs(30)));
        assert_eq!(row.group, "Metals");
        assert_eq!(row.start_day, Some(TradingDay::Mon));
        assert_eq!(row.start_time, Some(hms(7, 0, 0)));
        assert_eq!(row.end_day, Some(TradingDay::Sat));
        assert_eq!(row.break_times[0], Some(hms(5, 0, 0)));
        assert_eq!(row.break_times[1], Some(hms(6, 0, 0)));
    }

    #[test]
    fn header_is_skipped_and_short_rows_dropped() {
        let raw = format!("{GOLD_ROW}\nEURUSD,00:00:10,FX,Mon\n{GOLD_ROW}\n");
        let rows = parse_parameter_rows(&raw);

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn chinese_day_names_are_accepted() {
        let line = "HK50,00:01:00,Index,星期一,09:15:00,星期五,16:30:00,12:00:00,13:00:00,00:00:00,00:00:00,00:00:00,00:00:00";
        let row = ParameterRow::from_fields(&line.split(',').collect::<Vec<_>>()).unwrap();

        assert_eq!(row.start_day, Some(TradingDay::Mon));
        assert_eq!(row.end_day, Some(TradingDay::Fri));
    }

    #[test]
    fn unparsable_fields_keep_previous_values() {
        let mut instrument = Instrument::new("XAUUSD");
        instrument.set_tolerance(Duration::from_secs(45));
        *instrument.schedule_mut() = ScheduleWindow::new(TradingDay::Tue, hms(8, 0, 0), TradingDay::Thu, hms(18, 0, 0));
        instrument.breaks_mut()[0] = BreakWindow::new(hms(12, 0, 0), hms(12, 30, 0));

        let line = "XAUUSD,soon,Metals,Someday,late,Fri,bad,xx,13:00:00,,,,";
        let row = ParameterRow::from_fields(&line.split(',').collect::<Vec<_>>()).unwrap();
        row.apply_to(&mut instrument);

        assert_eq!(instrument.tolerance(), Duration::from_secs(45));
        assert_eq!(instrument.group(), "Metals");
        assert_eq!(instrument.schedule().start_day, TradingDay::Tue);
        assert_eq!(instrument.schedule().start_time, hms(8, 0, 0));
        assert_eq!(instrument.schedule().end_day, TradingDay::Fri);
        assert_eq!(instrument.schedule().end_time, hms(18, 0, 0));
        assert_eq!(instrument.breaks()[0], BreakWindow::new(hms(12, 0, 0), hms(13, 0, 0)));
    }

    #[test]
    fn hours_and_minutes_only_times_keep_previous_values() {
        let mut instrument = Instrument::new("XAUUSD");
        *instrument.schedule_mut() = ScheduleWindow::new(TradingDay::Mon, hms(7, 0, 0), TradingDay::Sat, hms(5, 0, 0));

        let line = "XAUUSD,00:00:30,Metals,Mon,22:00,Sat,05:30,00:00:00,00:00:00,00:00:00,00:00:00,00:00:00,00:00:00";
        let row = ParameterRow::from_fields(&line.split(',').collect::<Vec<_>>()).unwrap();
        row.apply_to(&mut instrument);

        assert_eq!(instrument.schedule().start_time, hms(7, 0, 0));
        assert_eq!(instrument.schedule().end_time, hms(5, 0, 0));
        assert_eq!(instrument.tolerance(), Duration::from_secs(30));
    }

    #[test]
    fn written_parameters_apply_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions").join("summer.csv");

        let mut original = Instrument::new("XAUUSD");
        original.set_tolerance(Duration::from_secs(90));
        original.set_group("Metals");
        *original.schedule_mut() = ScheduleWindow::new(TradingDay::Fri, hms(22, 0, 0), TradingDay::Mon, hms(6, 0, 0));
        original.breaks_mut()[2] = BreakWindow::new(hms(23, 30, 0), hms(0, 30, 0));

        write_parameters(&path, std::slice::from_ref(&original), DayNames::Chinese).unwrap();
        let rows = read_parameter_rows(&path).unwrap();

        let mut restored = Instrument::new("XAUUSD");
        rows[0].apply_to(&mut restored);
        assert_eq!(restored, original);
    }
}
