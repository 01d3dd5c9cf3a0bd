//! `Symbol,Time,Bid,Ask` quote files, the format terminal bridges export.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::warn;

use crate::market::quote_board::QuoteSnapshot;
use crate::types::price::Price;
use crate::types::quote::Quote;

pub const HEADER: [&str; 4] = ["Symbol", "Time", "Bid", "Ask"];
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn read_snapshot(path: &Path, tz: Tz) -> Result<QuoteSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read quote snapshot {}", path.display()))?;

    Ok(parse_snapshot(&raw, tz))
}

/// Malformed rows are dropped individually.
pub fn parse_snapshot(raw: &str, tz: Tz) -> QuoteSnapshot {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let mut quotes = HashMap::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(error) => {
                warn!(row = index + 2, "skipping unreadable snapshot row: {error}");
                continue;
            }
        };

        let fields: Vec<&str> = record.iter().collect();
        match parse_row(&fields, tz) {
            Some((symbol, quote)) => {
                quotes.insert(symbol, quote);
            }
            None => warn!(row = index + 2, ?fields, "skipping malformed snapshot row"),
        }
    }

    QuoteSnapshot::new(quotes)
}

fn parse_row(fields: &[&str], tz: Tz) -> Option<(String, Quote)> {
    let [symbol, time, bid, ask, ..] = fields else {
        return None;
    };
    if symbol.is_empty() {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(time, TIME_FORMAT).ok()?;
    let timestamp = tz.from_local_datetime(&naive).earliest()?;
    let bid = Price::try_new(bid.parse().ok()?)?;
    let ask = Price::try_new(ask.parse().ok()?)?;

    Some((symbol.to_string(), Quote::new(bid, ask, timestamp)))
}

/// Rewrites `path` in one step: readers see the old file or the new one.
pub fn write_snapshot(path: &Path, order: &[String], snapshot: &QuoteSnapshot) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for symbol in order {
        if let Some(quote) = snapshot.get(symbol) {
            let time = quote.timestamp.format(TIME_FORMAT).to_string();
            let bid = quote.bid.to_string();
            let ask = quote.ask.to_string();
            writer.write_record([symbol.as_str(), time.as_str(), bid.as_str(), ask.as_str()])?;
        }
    }

    let bytes = writer
        .into_inner()
        .context("failed to encode quote snapshot")?;

    let staging = path.with_extension("tmp");
    fs::write(&staging, bytes)
        .with_context(|| format!("failed to write quote snapshot {}", staging.display()))?;
    fs::rename(&staging, path)
        .with_context(|| format!("failed to replace quote snapshot {}", path.display()))?;

    Ok(())
}
