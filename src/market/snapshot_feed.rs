use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use chrono_tz::Tz;

use crate::market::market_source::{QuoteFeed, QuoteSample};
use crate::market::snapshot_file::read_snapshot;

/// Polls a quote file that an external terminal bridge keeps rewriting.
#[derive(Debug, Clone)]
pub struct SnapshotFileFeed {
    path: PathBuf,
    tz: Tz,
}

impl SnapshotFileFeed {
    pub fn new(path: impl Into<PathBuf>, tz: Tz) -> Self {
        Self {
            path: path.into(),
            tz,
        }
    }
}

#[async_trait]
impl QuoteFeed for SnapshotFileFeed {
    async fn sample(&self, symbols: &[String]) -> Result<Vec<QuoteSample>> {
        let (path, tz) = (self.path.clone(), self.tz);
        let snapshot = tokio::task::spawn_blocking(move || read_snapshot(&path, tz)).await??;

        Ok(symbols
            .iter()
            .filter_map(|symbol| {
                snapshot.get(symbol).map(|quote| QuoteSample {
                    symbol: symbol.clone(),
                    quote: *quote,
                })
            })
            .collect())
    }
}
