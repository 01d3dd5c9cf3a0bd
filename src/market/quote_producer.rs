use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::config_store::SharedStore;
use crate::market::market_source::QuoteFeed;
use crate::market::quote_board::{QuoteBoard, QuoteSnapshot};
use crate::market::snapshot_file::write_snapshot;
use crate::monitor::clock::Clock;

/// Polls a feed and publishes one complete snapshot per pass.
pub struct QuoteProducer {
    feed: Arc<dyn QuoteFeed>,
    store: SharedStore,
    board: QuoteBoard,
    clock: Arc<dyn Clock>,
    interval: Duration,
    mirror: Option<PathBuf>,
}

impl QuoteProducer {
    pub fn new(
        feed: Arc<dyn QuoteFeed>,
        store: SharedStore,
        board: QuoteBoard,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            feed,
            store,
            board,
            clock,
            interval,
            mirror: None,
        }
    }

    pub fn with_mirror(mut self, mirror: Option<PathBuf>) -> Self {
        self.mirror = mirror;
        self
    }

    /// One pass. On error the previously published snapshot stays current.
    pub async fn run_once(&self) -> Result<usize> {
        let symbols = self.store.lock().symbols();
        let samples = self.feed.sample(&symbols).await?;
        let now = self.clock.now();

        let mut quotes = HashMap::with_capacity(samples.len());
        for mut sample in samples {
            if sample.quote.timestamp > now {
                debug!(symbol = %sample.symbol, "quote time ahead of local clock; clamping");
                sample.quote.timestamp = now;
            }
            quotes.insert(sample.symbol, sample.quote);
        }

        let mut snapshot = QuoteSnapshot::new(quotes);
        let published = snapshot.len();

        if let Some(mirror) = self.mirror.clone() {
            snapshot = tokio::task::spawn_blocking(move || {
                if let Err(error) = write_snapshot(&mirror, &symbols, &snapshot) {
                    warn!(path = %mirror.display(), "failed to mirror quote snapshot: {error:?}");
                }
                snapshot
            })
            .await?;
        }

        self.board.publish(snapshot);

        Ok(published)
    }

    /// Runs passes until `stop` flips to true; a pass in flight always finishes.
    pub fn spawn(self, mut stop: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                if *stop.borrow() {
                    break;
                }

                match self.run_once().await {
                    Ok(count) => debug!(count, "published quote snapshot"),
                    Err(error) => error!("quote feed pass failed: {error:?}"),
                }

                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    changed = stop.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }
}
