use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::product_list::{default_instruments, read_product_list, write_product_list};
use crate::config::schedule_parameters::{ParameterRow, read_parameter_rows, write_parameters};
use crate::types::instrument::Instrument;
use crate::types::trading_day::DayNames;

/// Config mutations and evaluation ticks both go through this lock.
pub type SharedStore = Arc<Mutex<ConfigStore>>;

/// Ordered instrument registry keyed by symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    instruments: Vec<Instrument>,
}

impl ConfigStore {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        let mut store = Self::default();
        for instrument in instruments {
            if store.position(instrument.symbol()).is_some() {
                warn!(symbol = instrument.symbol(), "ignoring duplicate instrument");
                continue;
            }
            store.instruments.push(instrument);
        }
        store
    }

    /// Initial load; any read failure falls back to the built-in list.
    pub fn load(product_list: &Path) -> Self {
        if !product_list.exists() {
            warn!(path = %product_list.display(), "product list not found; using default instruments");
            return Self::new(default_instruments());
        }

        match read_product_list(product_list) {
            Ok(instruments) => {
                info!(path = %product_list.display(), count = instruments.len(), "loaded product list");
                Self::new(instruments)
            }
            Err(error) => {
                warn!("failed to load product list, using default instruments: {error:?}");
                Self::new(default_instruments())
            }
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn symbols(&self) -> Vec<String> {
        self.instruments
            .iter()
            .map(|instrument| instrument.symbol().to_string())
            .collect()
    }

    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|instrument| instrument.symbol() == symbol)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Replaces the instrument set. Tolerance, group, schedule and breaks of
    /// instruments already known survive; sounds and enabled come from
    /// `incoming`; instruments absent from `incoming` are dropped.
    pub fn reload(&mut self, incoming: Vec<Instrument>) -> Result<()> {
        if incoming.is_empty() {
            bail!("new instrument list has no valid symbols");
        }

        let previous: HashMap<&str, &Instrument> = self
            .instruments
            .iter()
            .map(|instrument| (instrument.symbol(), instrument))
            .collect();

        let merged: Vec<Instrument> = incoming
            .into_iter()
            .map(|mut instrument| {
                match previous.get(instrument.symbol()) {
                    Some(known) => {
                        instrument.set_tolerance(known.tolerance());
                        instrument.inherit_schedule(known);
                    }
                    None => instrument.set_tolerance(Duration::ZERO),
                }
                instrument.set_enabled(true);
                instrument
            })
            .collect();

        let dropped = self.len().saturating_sub(merged.len());
        *self = Self::new(merged);
        info!(count = self.len(), dropped, "instrument list reloaded");

        Ok(())
    }

    pub fn reload_from(&mut self, product_list: &Path) -> Result<()> {
        let incoming = read_product_list(product_list)?;

        self.reload(incoming)
    }

    /// Applies rows to known symbols; returns how many rows were applied.
    pub fn apply_parameters(&mut self, rows: &[ParameterRow]) -> usize {
        let mut applied = 0;
        for row in rows {
            match self.get_mut(&row.symbol) {
                Some(instrument) => {
                    row.apply_to(instrument);
                    applied += 1;
                }
                None => warn!(symbol = %row.symbol, "parameter row for unknown symbol skipped"),
            }
        }
        applied
    }

    pub fn apply_parameters_file(&mut self, path: &Path) -> Result<usize> {
        let rows = read_parameter_rows(path)?;
        let applied = self.apply_parameters(&rows);
        info!(path = %path.display(), applied, rows = rows.len(), "applied schedule parameters");

        Ok(applied)
    }

    pub fn save_product_list(&self, path: &Path) -> Result<()> {
        write_product_list(path, &self.instruments)
    }

    pub fn save_parameters(&self, path: &Path, day_names: DayNames) -> Result<()> {
        write_parameters(path, &self.instruments, day_names)
    }

    pub fn add(&mut self, symbol: &str) -> Result<()> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            bail!("symbol must not be blank");
        }
        if self.position(symbol).is_some() {
            bail!("{symbol} is already monitored");
        }

        self.instruments.push(Instrument::new(symbol));
        Ok(())
    }

    pub fn remove(&mut self, symbol: &str) -> Result<Instrument> {
        let index = self.require(symbol)?;

        Ok(self.instruments.remove(index))
    }

    /// Returns false when already first.
    pub fn move_up(&mut self, symbol: &str) -> Result<bool> {
        let index = self.require(symbol)?;
        if index == 0 {
            return Ok(false);
        }

        self.instruments.swap(index - 1, index);
        Ok(true)
    }

    /// Returns false when already last.
    pub fn move_down(&mut self, symbol: &str) -> Result<bool> {
        let index = self.require(symbol)?;
        if index + 1 >= self.instruments.len() {
            return Ok(false);
        }

        self.instruments.swap(index, index + 1);
        Ok(true)
    }

    pub fn set_enabled(&mut self, symbol: &str, enabled: bool) -> Result<()> {
        self.require_mut(symbol)?.set_enabled(enabled);
        Ok(())
    }

    pub fn set_tolerance(&mut self, symbol: &str, tolerance: Duration) -> Result<()> {
        self.require_mut(symbol)?.set_tolerance(tolerance);
        Ok(())
    }

    pub fn set_digits(&mut self, symbol: &str, digits: u32) -> Result<()> {
        self.require_mut(symbol)?.set_digits(digits);
        Ok(())
    }

    /// Enables everything unless everything is already enabled.
    pub fn toggle_all_alerts(&mut self) -> bool {
        let enable = !self.instruments.iter().all(Instrument::is_enabled);
        for instrument in &mut self.instruments {
            instrument.set_enabled(enable);
        }
        enable
    }

    fn position(&self, symbol: &str) -> Option<usize> {
        self.instruments
            .iter()
            .position(|instrument| instrument.symbol() == symbol)
    }

    fn get_mut(&mut self, symbol: &str) -> Option<&mut Instrument> {
        self.instruments
            .iter_mut()
            .find(|instrument| instrument.symbol() == symbol)
    }

    fn require(&self, symbol: &str) -> Result<usize> {
        self.position(symbol)
            .ok_or_else(|| anyhow!("unknown symbol: {symbol}"))
    }

    fn require_mut(&mut self, symbol: &str) -> Result<&mut Instrument> {
        self.get_mut(symbol)
            .ok_or_else(|| anyhow!("unknown symbol: {symbol}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schedule_parameters::parse_parameter_rows;
    use crate::types::schedule::{BreakWindow, ScheduleWindow};
    use crate::types::trading_day::TradingDay;
    use chrono::NaiveTime;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn mk_store(symbols: &[&str]) -> ConfigStore {
        ConfigStore::new(symbols.iter().map(|symbol| Instrument::new(*symbol)).collect())
    }

    fn symbols(store: &ConfigStore) -> Vec<String> {
        store.symbols()
    }

    #[test]
    fn reload_preserves_known_tolerance_and_schedule() {
        let mut store = mk_store(&["XAUUSD", "EURUSD"]);
        store.set_tolerance("XAUUSD", Duration::from_secs(30)).unwrap();
        store.set_enabled("XAUUSD", false).unwrap();
        {
            let gold = store.get_mut("XAUUSD").unwrap();
            gold.set_group("Metals");
            *gold.schedule_mut() = ScheduleWindow::new(TradingDay::Mon, hms(7, 0, 0), TradingDay::Sat, hms(5, 0, 0));
            gold.breaks_mut()[0] = BreakWindow::new(hms(5, 0, 0), hms(6, 0, 0));
        }

        store
            .reload(vec![
                Instrument::with_sounds("HK50", "hk.wav", ""),
                Instrument::with_sounds("XAUUSD", "gold.wav", "gold_ok.wav"),
            ])
            .unwrap();

        assert_eq!(symbols(&store), vec!["HK50", "XAUUSD"]);
        let gold = store.get("XAUUSD").unwrap();
        assert_eq!(gold.tolerance(), Duration::from_secs(30));
        assert_eq!(gold.group(), "Metals");
        assert_eq!(gold.schedule().start_time, hms(7, 0, 0));
        assert_eq!(gold.breaks()[0], BreakWindow::new(hms(5, 0, 0), hms(6, 0, 0)));
        assert_eq!(gold.stop_sound_raw(), "gold.wav");
        assert!(gold.is_enabled());

        let index = store.get("HK50").unwrap();
        assert_eq!(index.tolerance(), Duration::ZERO);
        assert!(store.get("EURUSD").is_none());
    }

    #[test]
    fn reload_takes_digits_from_the_source_or_keeps_known_ones() {
        let mut store = mk_store(&["USDJPY", "XAUUSD"]);
        store.set_digits("USDJPY", 3).unwrap();
        store.set_digits("XAUUSD", 2).unwrap();

        store
            .reload(crate::config::product_list::parse_product_list("USDJPY\nXAUUSD,,,1\n").unwrap())
            .unwrap();

        assert_eq!(store.get("USDJPY").unwrap().digits(), 3);
        assert_eq!(store.get("XAUUSD").unwrap().digits(), 1);
    }

    #[test]
    fn empty_reload_is_rejected_and_changes_nothing() {
        let mut store = mk_store(&["XAUUSD"]);
        let before = store.clone();

        assert!(store.reload(Vec::new()).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn reload_from_file_merges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fx.csv");
        std::fs::write(&path, "EURUSD,eur.wav\nGBPUSD\n").unwrap();

        let mut store = mk_store(&["EURUSD"]);
        store.set_tolerance("EURUSD", Duration::from_secs(12)).unwrap();
        store.reload_from(&path).unwrap();

        assert_eq!(symbols(&store), vec!["EURUSD", "GBPUSD"]);
        assert_eq!(store.get("EURUSD").unwrap().tolerance(), Duration::from_secs(12));
    }

    #[test]
    fn load_falls_back_to_defaults_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(&dir.path().join("product_list.csv"));

        assert_eq!(store.len(), crate::config::product_list::DEFAULT_SYMBOLS.len());
        assert!(store.instruments().iter().all(|instrument| instrument.is_enabled()));
        assert!(store.instruments().iter().all(|instrument| instrument.tolerance() == Duration::ZERO));
    }

    #[test]
    fn apply_updates_known_symbols_only() {
        let mut store = mk_store(&["XAUUSD", "EURUSD"]);
        store.set_tolerance("EURUSD", Duration::from_secs(7)).unwrap();
        let untouched = store.get("EURUSD").unwrap().clone();

        let rows = parse_parameter_rows(
            "header\n\
XAUUSD,00:00:30,Metals,Mon,07:00:00,Sat,05:00:00,05:00:00,06:00:00,00:00:00,00:00:00,00:00:00,00:00:00\n\
NGAS,00:09:00,Energy,Mon,07:00:00,Sat,05:00:00,00:00:00,00:00:00,00:00:00,00:00:00,00:00:00,00:00:00\n\
EURUSD,00:00:09,FX\n",
        );
        let applied = store.apply_parameters(&rows);

        assert_eq!(applied, 1);
        assert_eq!(store.len(), 2);
        assert!(store.get("NGAS").is_none());
        assert_eq!(store.get("XAUUSD").unwrap().tolerance(), Duration::from_secs(30));
        assert_eq!(store.get("XAUUSD").unwrap().schedule().end_day, TradingDay::Sat);
        assert_eq!(store.get("EURUSD").unwrap(), &untouched);
    }

    #[test]
    fn unknown_symbol_only_file_is_a_no_op() {
        let mut store = mk_store(&["XAUUSD"]);
        let before = store.clone();

        let rows = parse_parameter_rows(
            "header\nNGAS,00:09:00,Energy,Mon,07:00:00,Sat,05:00:00,00:00:00,00:00:00,00:00:00,00:00:00,00:00:00,00:00:00\n",
        );

        assert_eq!(store.apply_parameters(&rows), 0);
        assert_eq!(store, before);
    }

    #[test]
    fn ordering_edits() {
        let mut store = mk_store(&["A", "B", "C"]);

        assert!(store.move_up("C").unwrap());
        assert_eq!(symbols(&store), vec!["A", "C", "B"]);
        assert!(!store.move_up("A").unwrap());
        assert!(!store.move_down("B").unwrap());
        assert!(store.move_down("A").unwrap());
        assert_eq!(symbols(&store), vec!["C", "A", "B"]);

        store.add("D").unwrap();
        assert!(store.add("D").is_err());
        assert!(store.add("  ").is_err());
        assert_eq!(store.remove("A").unwrap().symbol(), "A");
        assert_eq!(symbols(&store), vec!["C", "B", "D"]);
        assert!(store.remove("A").is_err());
    }

    #[test]
    fn toggle_all_enables_unless_all_enabled() {
        let mut store = mk_store(&["A", "B"]);

        assert!(!store.toggle_all_alerts());
        assert!(store.instruments().iter().all(|instrument| !instrument.is_enabled()));

        store.set_enabled("A", true).unwrap();
        assert!(store.toggle_all_alerts());
        assert!(store.instruments().iter().all(Instrument::is_enabled));
    }

    #[test]
    fn save_and_load_keep_every_instrument() {
        let dir = tempfile::tempdir().unwrap();
        let products = dir.path().join("product_list.csv");
        let parameters = dir.path().join("params.csv");

        let mut store = mk_store(&["XAUUSD", "HK50", "EURUSD"]);
        store.set_tolerance("HK50", Duration::from_secs(60)).unwrap();
        store.save_product_list(&products).unwrap();
        store.save_parameters(&parameters, DayNames::English).unwrap();

        let mut restored = ConfigStore::load(&products);
        restored.apply_parameters_file(&parameters).unwrap();

        assert_eq!(restored, store);
    }
}
