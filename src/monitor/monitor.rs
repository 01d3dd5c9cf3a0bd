use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::alerting::alert_engine::{InstrumentStatus, StalenessAlertEngine, TickReport};
use crate::alerting::effect_sink::EffectSink;
use crate::config::config_store::SharedStore;
use crate::market::market_source::QuoteFeed;
use crate::market::quote_board::QuoteBoard;
use crate::market::quote_producer::QuoteProducer;
use crate::monitor::clock::Clock;
use crate::types::instrument::Instrument;

/// The evaluation side: everything one tick touches.
pub struct Ticker {
    store: SharedStore,
    board: QuoteBoard,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EffectSink>,
    engine: Mutex<StalenessAlertEngine>,
    last: Mutex<Vec<InstrumentStatus>>,
}

impl Ticker {
    pub fn new(store: SharedStore, board: QuoteBoard, clock: Arc<dyn Clock>, sink: Arc<dyn EffectSink>) -> Self {
        Self {
            store,
            board,
            clock,
            sink,
            engine: Mutex::new(StalenessAlertEngine::new()),
            last: Mutex::new(Vec::new()),
        }
    }

    /// Evaluates every instrument against the current snapshot under the
    /// store lock, then hands events to the sink outside it.
    pub fn tick(&self) -> TickReport {
        let now = self.clock.now();
        let snapshot = self.board.current();

        let report = {
            let store = self.store.lock();
            let mut engine = self.engine.lock();
            engine.tick(now, store.instruments(), &snapshot)
        };

        for notice in &report.notices {
            self.sink.on_alert(notice);
        }
        for status in &report.statuses {
            debug!(%status);
        }

        *self.last.lock() = report.statuses.clone();
        report
    }

    pub fn last_statuses(&self) -> Vec<InstrumentStatus> {
        self.last.lock().clone()
    }

    /// Drops alert state of instruments that left the registry.
    pub fn prune(&self, instruments: &[Instrument]) {
        self.engine.lock().retain_instruments(instruments);
    }

    pub fn reset(&self) {
        self.engine.lock().reset();
        self.last.lock().clear();
    }

    fn spawn(self: Arc<Self>, interval: Duration, mut stop: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                if *stop.borrow() {
                    break;
                }

                // The sink may touch the filesystem or the audio device.
                let ticker = Arc::clone(&self);
                if let Err(error) = tokio::task::spawn_blocking(move || ticker.tick()).await {
                    error!("tick did not complete: {error:?}");
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
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

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub tick_interval: Duration,
    pub feed_interval: Duration,
    pub snapshot_mirror: Option<PathBuf>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            feed_interval: Duration::from_millis(100),
            snapshot_mirror: None,
        }
    }
}

struct Running {
    stop: watch::Sender<bool>,
    producer: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

/// Start/stop supervisor for the feed producer and the evaluation cadence.
pub struct Monitor {
    ticker: Arc<Ticker>,
    feed: Arc<dyn QuoteFeed>,
    settings: MonitorSettings,
    running: Option<Running>,
}

impl Monitor {
    pub fn new(
        store: SharedStore,
        feed: Arc<dyn QuoteFeed>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EffectSink>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            ticker: Arc::new(Ticker::new(store, QuoteBoard::new(), clock, sink)),
            feed,
            settings,
            running: None,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.ticker.store
    }

    pub fn ticker(&self) -> &Arc<Ticker> {
        &self.ticker
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Returns false if already running. Every instrument starts from Idle.
    pub fn start(&mut self) -> bool {
        if self.running.is_some() {
            return false;
        }

        self.ticker.reset();
        self.ticker.board.clear();

        let (stop, stop_rx) = watch::channel(false);
        let producer = QuoteProducer::new(
            Arc::clone(&self.feed),
            self.ticker.store.clone(),
            self.ticker.board.clone(),
            Arc::clone(&self.ticker.clock),
            self.settings.feed_interval,
        )
        .with_mirror(self.settings.snapshot_mirror.clone())
        .spawn(stop_rx.clone());
        let ticker = Arc::clone(&self.ticker).spawn(self.settings.tick_interval, stop_rx);

        self.running = Some(Running {
            stop,
            producer,
            ticker,
        });
        info!(
            tick_ms = self.settings.tick_interval.as_millis() as u64,
            feed_ms = self.settings.feed_interval.as_millis() as u64,
            "monitoring started"
        );

        true
    }

    /// Returns false if not running. Waits for the pass in flight on each task.
    pub async fn stop(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };

        if running.stop.send(true).is_err() {
            warn!("monitor tasks already gone");
        }

        for (name, handle) in [("producer", running.producer), ("ticker", running.ticker)] {
            if let Err(error) = handle.await {
                error!(task = name, "monitor task ended abnormally: {error:?}");
            }
        }
        info!("monitoring stopped");

        true
    }

    /// Replaces the instrument set from `path`; alert state of dropped
    /// instruments goes with them.
    pub fn reload(&self, path: &Path) -> Result<()> {
        let mut store = self.ticker.store.lock();
        store.reload_from(path)?;
        self.ticker.prune(store.instruments());

        Ok(())
    }

    pub fn remove(&self, symbol: &str) -> Result<()> {
        let mut store = self.ticker.store.lock();
        store.remove(symbol)?;
        self.ticker.prune(store.instruments());

        Ok(())
    }

    pub fn statuses(&self) -> Vec<InstrumentStatus> {
        self.ticker.last_statuses()
    }
}
