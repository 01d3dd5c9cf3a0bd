use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only `timestamp,symbol,1` lines, one per played alert.
#[derive(Debug, Clone)]
pub struct PlayLog {
    path: PathBuf,
}

impl PlayLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, at: DateTime<Tz>, symbol: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open play log {}", self.path.display()))?;

        writeln!(file, "{},{},1", at.format(TIMESTAMP_FORMAT), symbol)
            .with_context(|| format!("failed to append to play log {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Shanghai;

    #[test]
    fn appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let log = PlayLog::new(dir.path().join("play_log.txt"));
        let at = Shanghai.with_ymd_and_hms(2025, 3, 4, 9, 30, 5).unwrap();

        log.append(at, "XAUUSD").unwrap();
        log.append(at, "EURUSD").unwrap();

        let written = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            written,
            "2025-03-04 09:30:05,XAUUSD,1\n2025-03-04 09:30:05,EURUSD,1\n"
        );
    }

    #[test]
    fn unwritable_location_reports_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = PlayLog::new(dir.path().join("missing").join("play_log.txt"));
        let at = Shanghai.with_ymd_and_hms(2025, 3, 4, 9, 30, 5).unwrap();

        assert!(log.append(at, "XAUUSD").is_err());
    }
}
