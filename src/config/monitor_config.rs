use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::trading_day::DayNames;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// IANA name of the timezone schedules and quote times are read in.
    pub timezone: String,
    pub product_list: PathBuf,
    /// Parameter file used when no session is selected.
    pub parameters: PathBuf,
    pub sessions: PathBuf,
    /// Last selected session, re-applied at startup.
    pub session: Option<String>,
    /// Input of the snapshot-file feed.
    pub quote_snapshot: PathBuf,
    /// Where to mirror each published snapshot, if anywhere.
    pub snapshot_mirror: Option<PathBuf>,
    pub play_log: PathBuf,
    pub tick_interval_ms: u64,
    pub feed_interval_ms: u64,
    pub day_names: DayNames,
    pub sound_player: SoundPlayerConfig,
    pub bridge_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundPlayerConfig {
    /// Empty disables playback.
    pub program: String,
    pub args: Vec<String>,
}

impl Default for SoundPlayerConfig {
    fn default() -> Self {
        Self {
            program: "aplay".to_string(),
            args: vec!["-q".to_string()],
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Shanghai".to_string(),
            product_list: PathBuf::from("product_list.csv"),
            parameters: PathBuf::from("trading_schedule_parameters.csv"),
            sessions: PathBuf::from("clock_change.txt"),
            session: None,
            quote_snapshot: PathBuf::from("latest_quotes.csv"),
            snapshot_mirror: None,
            play_log: PathBuf::from("play_log.txt"),
            tick_interval_ms: 1_000,
            feed_interval_ms: 100,
            day_names: DayNames::default(),
            sound_player: SoundPlayerConfig::default(),
            bridge_url: "ws://127.0.0.1:8765".to_string(),
        }
    }
}

impl MonitorConfig {
    pub const FILE_NAME: &'static str = "quotewatch.yml";

    /// Never fails: a missing or broken file falls back to defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found; using defaults");
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(config) => config,
            Err(error) => {
                warn!(path = %path.display(), "config unusable, using defaults: {error:?}");
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;

        let config: MonitorConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        config.validate().context("config validation failed")?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_yaml::to_string(self).context("failed to encode config")?;
        fs::write(path, raw).with_context(|| format!("failed to write config {}", path.display()))?;

        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|error| anyhow!("unknown timezone \"{}\": {error}", self.timezone))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn feed_interval(&self) -> Duration {
        Duration::from_millis(self.feed_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        self.timezone()?;
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be > 0");
        }
        if self.feed_interval_ms == 0 {
            bail!("feed_interval_ms must be > 0");
        }
        Ok(())
    }
}
