use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::{error, info, warn};

use quotewatch::config::config_store::ConfigStore;
use quotewatch::config::monitor_config::MonitorConfig;
use quotewatch::logging::init_logging;
use quotewatch::monitor::clock::SystemClock;
use quotewatch::monitor::monitor::{Monitor, MonitorSettings};
use quotewatch::monitor::operator::{Command, HELP, Operator};
use quotewatch::scenario::feeds::FeedKind;
use quotewatch::scenario::scenario::Scenario;

#[derive(Debug, Clone, Parser)]
struct Args {
    #[arg(long, default_value = MonitorConfig::FILE_NAME)]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value = "snapshot")]
    pub feed: FeedKind,

    /// Overrides `product_list` from the config file.
    #[arg(long)]
    pub product_list: Option<PathBuf>,

    /// Session to apply instead of the remembered one.
    #[arg(long)]
    pub session: Option<String>,

    /// Load everything but wait for `start`.
    #[arg(long)]
    pub paused: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logging();

    let args = Args::parse();
    let mut config = MonitorConfig::load(&args.config);
    if let Some(product_list) = args.product_list {
        config.product_list = product_list;
    }

    let tz = config.timezone()?;
    let store = ConfigStore::load(&config.product_list).into_shared();
    let feed = Scenario::quote_feed(args.feed, &config)?;
    let sink = Scenario::effect_sink(&config);
    let settings = MonitorSettings {
        tick_interval: config.tick_interval(),
        feed_interval: config.feed_interval(),
        snapshot_mirror: config.snapshot_mirror.clone(),
    };

    let monitor = Monitor::new(store, feed, Arc::new(SystemClock::new(tz)), sink, settings);
    let mut operator = Operator::new(monitor, config, args.config);

    match args.session {
        Some(name) => {
            if let Err(error) = operator.apply_session(&name) {
                warn!(session = %name, "session not applied: {error:?}");
            }
        }
        None => operator.restore_parameters(),
    }

    if !args.paused {
        operator.execute(Command::Start).await?;
    }
    info!(instruments = operator.monitor().store().lock().len(), timezone = %tz, "quotewatch ready");
    println!("{HELP}");

    tokio::select! {
        result = operator.run(BufReader::new(tokio::io::stdin())) => {
            if let Err(error) = result {
                error!("operator console failed: {error:?}");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("interrupted"),
                Err(error) => error!("failed to listen for ctrl-c: {error}"),
            }
        }
    }

    operator.shutdown().await
}
