use std::sync::Arc;

use anyhow::Result;

use crate::{
    alerting::{
        effect_sink::{AudibleAlertSink, EffectSink},
        play_log::PlayLog,
        sound::{CommandSoundPlayer, SilentPlayer, SoundPlayer},
    },
    config::monitor_config::MonitorConfig,
    market::{bridge_feed::BridgeFeed, market_source::QuoteFeed, snapshot_feed::SnapshotFileFeed},
    scenario::feeds::FeedKind,
};

pub struct Scenario;

type DynamicFeed = Arc<dyn QuoteFeed>;

impl Scenario {
    /// The bridge feed spawns its connection task, so this needs a runtime.
    pub fn quote_feed(kind: FeedKind, config: &MonitorConfig) -> Result<DynamicFeed> {
        tracing::info!(feed = %kind, "creating quote feed");

        let tz = config.timezone()?;
        let feed: DynamicFeed = match kind {
            FeedKind::Snapshot => Arc::new(SnapshotFileFeed::new(config.quote_snapshot.clone(), tz)),
            FeedKind::Bridge => Arc::new(BridgeFeed::spawn(config.bridge_url.clone(), tz)),
        };

        Ok(feed)
    }

    pub fn effect_sink(config: &MonitorConfig) -> Arc<dyn EffectSink> {
        let player: Box<dyn SoundPlayer> = if config.sound_player.program.trim().is_empty() {
            tracing::info!("sound playback disabled");
            Box::new(SilentPlayer)
        } else {
            Box::new(CommandSoundPlayer::new(
                config.sound_player.program.clone(),
                config.sound_player.args.clone(),
            ))
        };

        Arc::new(AudibleAlertSink::new(player, PlayLog::new(config.play_log.clone())))
    }
}
