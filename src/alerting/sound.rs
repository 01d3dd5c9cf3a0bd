use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, warn};

pub trait SoundPlayer: Send + Sync {
    /// Starts playback and returns without waiting for it to finish.
    fn play(&self, path: &Path) -> Result<()>;
}

/// Hands the wav file to an external player program, e.g. `aplay -q`.
#[derive(Debug, Clone)]
pub struct CommandSoundPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandSoundPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl SoundPlayer for CommandSoundPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        let Ok(runtime) = Handle::try_current() else {
            bail!("no async runtime available to play {}", path.display());
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .kill_on_drop(false)
            .spawn()
            .with_context(|| format!("failed to start {} for {}", self.program, path.display()))?;

        let path = path.to_path_buf();
        runtime.spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!(path = %path.display(), "sound finished"),
                Ok(status) => warn!(path = %path.display(), %status, "sound player exited with failure"),
                Err(error) => warn!(path = %path.display(), "sound player did not finish: {error:?}"),
            }
        });

        Ok(())
    }
}

/// Used when no player program is configured.
#[derive(Debug, Clone, Default)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "sound playback disabled");

        Ok(())
    }
}
