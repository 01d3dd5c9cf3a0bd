use std::path::PathBuf;

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use crate::alerting::alert_state::AlertEvent;
use crate::alerting::play_log::PlayLog;
use crate::alerting::sound::SoundPlayer;

#[derive(Debug, Clone, PartialEq)]
pub struct AlertNotice {
    pub symbol: String,
    pub event: AlertEvent,
    pub at: DateTime<Tz>,
    /// The configured wav for this event, if any.
    pub sound: Option<PathBuf>,
}

/// Receives alert events after the state transition has been committed.
/// Implementations swallow their own failures.
pub trait EffectSink: Send + Sync {
    fn on_alert(&self, notice: &AlertNotice);
}

pub struct AudibleAlertSink {
    player: Box<dyn SoundPlayer>,
    play_log: PlayLog,
}

impl AudibleAlertSink {
    pub fn new(player: Box<dyn SoundPlayer>, play_log: PlayLog) -> Self {
        Self { player, play_log }
    }

    fn play(&self, notice: &AlertNotice) {
        let Some(path) = &notice.sound else {
            debug!(symbol = %notice.symbol, event = %notice.event, "no sound configured");
            return;
        };

        if !path.exists() {
            warn!(symbol = %notice.symbol, path = %path.display(), "sound file not found; skipping playback");
            return;
        }

        if let Err(error) = self.player.play(path) {
            error!(symbol = %notice.symbol, "failed to play alert sound: {error:?}");
        }
    }
}

impl EffectSink for AudibleAlertSink {
    fn on_alert(&self, notice: &AlertNotice) {
        match notice.event {
            AlertEvent::Stopped => warn!(symbol = %notice.symbol, at = %notice.at, "quotes stopped"),
            AlertEvent::Resumed => info!(symbol = %notice.symbol, at = %notice.at, "quotes resumed"),
        }

        self.play(notice);

        if let Err(error) = self.play_log.append(notice.at, &notice.symbol) {
            error!(symbol = %notice.symbol, "failed to write play log: {error:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use chrono::TimeZone;
    use chrono_tz::Asia::Shanghai;
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct RecordingPlayer {
        played: Arc<Mutex<Vec<PathBuf>>>,
        fail: bool,
    }

    impl SoundPlayer for RecordingPlayer {
        fn play(&self, path: &Path) -> Result<()> {
            if self.fail {
                bail!("device busy");
            }
            self.played.lock().push(path.to_path_buf());
            Ok(())
        }
    }

    fn mk_notice(sound: Option<PathBuf>) -> AlertNotice {
        AlertNotice {
            symbol: "XAUUSD".to_string(),
            event: AlertEvent::Stopped,
            at: Shanghai.with_ymd_and_hms(2025, 3, 4, 9, 30, 0).unwrap(),
            sound,
        }
    }

    #[test]
    fn plays_existing_sound_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("stop.wav");
        std::fs::write(&wav, b"RIFF").unwrap();

        let player = RecordingPlayer::default();
        let log = PlayLog::new(dir.path().join("play_log.txt"));
        let sink = AudibleAlertSink::new(Box::new(player.clone()), log.clone());

        sink.on_alert(&mk_notice(Some(wav.clone())));

        assert_eq!(*player.played.lock(), vec![wav]);
        let written = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(written, "2025-03-04 09:30:00,XAUUSD,1\n");
    }

    #[test]
    fn missing_sound_still_logs() {
        let dir = tempfile::tempdir().unwrap();
        let player = RecordingPlayer::default();
        let log = PlayLog::new(dir.path().join("play_log.txt"));
        let sink = AudibleAlertSink::new(Box::new(player.clone()), log.clone());

        sink.on_alert(&mk_notice(Some(dir.path().join("gone.wav"))));
        sink.on_alert(&mk_notice(None));

        assert!(player.played.lock().is_empty());
        let written = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn player_failure_does_not_skip_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("stop.wav");
        std::fs::write(&wav, b"RIFF").unwrap();

        let player = RecordingPlayer {
            fail: true,
            ..Default::default()
        };
        let log = PlayLog::new(dir.path().join("play_log.txt"));
        let sink = AudibleAlertSink::new(Box::new(player), log.clone());

        sink.on_alert(&mk_notice(Some(wav)));

        let written = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(written.lines().count(), 1);
    }
}
