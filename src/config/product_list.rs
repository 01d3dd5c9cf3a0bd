//! `symbol,stopWav,resumeWav[,digits]` records, no header. The digits column
//! is only written when it differs from the default.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::types::instrument::{DEFAULT_DIGITS, Instrument};

pub const DEFAULT_SYMBOLS: &[&str] = &[
    "XAUUSD", "XAGUSD", "PLT", "PAD", "COPPER", "IRON", "GAUCNH", "XALUSD", "HKGHKD", "XNIUSD",
    "XZNUSD", "AUDUSD", "EURUSD", "GBPUSD", "NZDUSD", "USDCAD", "USDCHF", "USDJPY", "EURJPY",
    "NZDJPY", "GBPJPY", "CADJPY", "AUDJPY", "EURCHF", "EURGBP", "EURAUD", "GBPCHF", "GBPAUD",
    "AUDNZD", "EURCAD", "EURNZD", "GBPCAD", "AUDCAD", "NZDCAD", "USDCNH", "HKDCNH", "USOil",
    "UKOil", "NGAS", "CHINA300", "HK50", "JPN225", "A50", "STI", "AS200", "INDIA50", "KS200",
    "SH50", "VN30", "DJ30", "SP500", "TECH100", "RUSS2000", "USDINDEX", "GER30", "FRA40", "UK100",
    "EUR50", "EUR600", "AEX25", "SOYBEAN", "CORN", "WHEAT", "COCOA", "COFFEE", "SUGAR", "COTTON",
    "00005.HK", "AAPL", "BTCUSDT", "ETHUSDT",
];

pub fn default_instruments() -> Vec<Instrument> {
    DEFAULT_SYMBOLS.iter().map(|symbol| Instrument::new(*symbol)).collect()
}

pub fn read_product_list(path: &Path) -> Result<Vec<Instrument>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read product list {}", path.display()))?;

    parse_product_list(&raw)
}

/// Blank-symbol rows are skipped; a repeated symbol keeps its first row.
pub fn parse_product_list(raw: &str) -> Result<Vec<Instrument>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut seen = HashSet::new();
    let mut instruments = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(error) => {
                warn!(row = index + 1, "skipping unreadable product row: {error}");
                continue;
            }
        };

        let symbol = record.get(0).unwrap_or_default().trim();
        if symbol.is_empty() {
            continue;
        }
        if !seen.insert(symbol.to_string()) {
            warn!(row = index + 1, symbol, "duplicate symbol in product list; keeping the first");
            continue;
        }

        let mut instrument = Instrument::with_sounds(
            symbol,
            record.get(1).unwrap_or_default(),
            record.get(2).unwrap_or_default(),
        );
        if let Some(raw) = record.get(3).map(str::trim).filter(|raw| !raw.is_empty()) {
            match raw.parse::<u32>() {
                Ok(digits) => instrument.set_digits(digits),
                Err(error) => warn!(row = index + 1, symbol, raw, "ignoring invalid digits: {error}"),
            }
        }

        instruments.push(instrument);
    }

    Ok(instruments)
}

pub fn write_product_list(path: &Path, instruments: &[Instrument]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    for instrument in instruments {
        let mut record = vec![
            instrument.symbol().to_string(),
            instrument.stop_sound_raw().to_string(),
            instrument.resume_sound_raw().to_string(),
        ];
        if instrument.digits() != DEFAULT_DIGITS {
            record.push(instrument.digits().to_string());
        }

        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().context("failed to encode product list")?;
    fs::write(path, bytes).with_context(|| format!("failed to write product list {}", path.display()))?;

    Ok(())
}
