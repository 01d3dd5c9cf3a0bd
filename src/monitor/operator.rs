//! Line-oriented operator console driving the monitor.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info, warn};

use crate::config::config_store::ConfigStore;
use crate::config::monitor_config::MonitorConfig;
use crate::config::sessions::SessionCatalog;
use crate::monitor::monitor::Monitor;
use crate::types::instrument::MAX_DIGITS;
use crate::types::time_of_day::parse_tolerance;

pub const HELP: &str = "commands: start | stop | reload [path] | session <name> | apply <path> | \
enable <sym> | disable <sym> | toggle-all | tolerance <sym> <HH:MM:SS> | digits <sym> <n> | \
add <sym> | remove <sym> | up <sym> | down <sym> | save | status | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Reload(Option<PathBuf>),
    Session(String),
    Apply(PathBuf),
    Enable(String),
    Disable(String),
    ToggleAll,
    Tolerance(String, Duration),
    Digits(String, u32),
    Add(String),
    Remove(String),
    Up(String),
    Down(String),
    Save,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let mut arg = |what: &str| {
            words
                .next()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("{name}: missing {what}"))
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "reload" => Self::Reload(arg("path").ok().map(PathBuf::from)),
            "session" => Self::Session(arg("session name")?),
            "apply" => Self::Apply(PathBuf::from(arg("path")?)),
            "enable" => Self::Enable(arg("symbol")?),
            "disable" => Self::Disable(arg("symbol")?),
            "toggle-all" => Self::ToggleAll,
            "tolerance" => {
                let symbol = arg("symbol")?;
                let raw = arg("tolerance")?;
                let tolerance = parse_tolerance(&raw).ok_or_else(|| anyhow!("invalid tolerance: {raw}"))?;
                Self::Tolerance(symbol, tolerance)
            }
            "digits" => {
                let symbol = arg("symbol")?;
                let raw = arg("digits")?;
                let digits: u32 = raw.parse().with_context(|| format!("invalid digits: {raw}"))?;
                if digits > MAX_DIGITS {
                    bail!("digits must be at most {MAX_DIGITS}, got {digits}");
                }
                Self::Digits(symbol, digits)
            }
            "add" => Self::Add(arg("symbol")?),
            "remove" => Self::Remove(arg("symbol")?),
            "up" => Self::Up(arg("symbol")?),
            "down" => Self::Down(arg("symbol")?),
            "save" => Self::Save,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command: {other}"),
        };

        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the monitor plus the persisted selection (product path, session).
pub struct Operator {
    monitor: Monitor,
    config: MonitorConfig,
    config_path: PathBuf,
    sessions: SessionCatalog,
}

impl Operator {
    pub fn new(monitor: Monitor, config: MonitorConfig, config_path: PathBuf) -> Self {
        let sessions = SessionCatalog::load(&config.sessions);

        Self {
            monitor,
            config,
            config_path,
            sessions,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// File parameters are saved to: the selected session's, else the default.
    pub fn parameters_path(&self) -> PathBuf {
        self.config
            .session
            .as_deref()
            .and_then(|name| self.sessions.path_for(name))
            .unwrap_or(self.config.parameters.as_path())
            .to_path_buf()
    }

    /// Re-applies the remembered session, or the default parameter file,
    /// if the file is there.
    pub fn restore_parameters(&mut self) {
        let path = self.parameters_path();
        if !path.exists() {
            info!(path = %path.display(), "no schedule parameters to restore");
            return;
        }

        if let Err(error) = self.apply(&path) {
            warn!("failed to restore schedule parameters: {error:?}");
        }
    }

    pub fn apply_session(&mut self, name: &str) -> Result<usize> {
        let path = self
            .sessions
            .path_for(name)
            .ok_or_else(|| anyhow!("unknown session: {name}"))?
            .to_path_buf();
        let applied = self.apply(&path)?;
        self.config.session = Some(name.to_string());

        Ok(applied)
    }

    fn apply(&self, path: &Path) -> Result<usize> {
        self.monitor.store().lock().apply_parameters_file(path)
    }

    pub fn save(&self) -> Result<()> {
        let parameters = self.parameters_path();
        let store = self.monitor.store().lock();
        store.save_product_list(&self.config.product_list)?;
        store.save_parameters(&parameters, self.config.day_names)?;
        info!(
            products = %self.config.product_list.display(),
            parameters = %parameters.display(),
            "configuration saved"
        );

        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Start => {
                if !self.monitor.start() {
                    warn!("monitoring already running");
                }
            }
            Command::Stop => {
                if !self.monitor.stop().await {
                    warn!("monitoring is not running");
                }
            }
            Command::Reload(path) => {
                let path = path.unwrap_or_else(|| self.config.product_list.clone());
                self.monitor.reload(&path)?;
                self.config.product_list = path;
            }
            Command::Session(name) => {
                let applied = self.apply_session(&name)?;
                info!(session = %name, applied, "session applied");
            }
            Command::Apply(path) => {
                self.apply(&path)?;
            }
            Command::Enable(symbol) => self.store_mut(|store| store.set_enabled(&symbol, true))?,
            Command::Disable(symbol) => self.store_mut(|store| store.set_enabled(&symbol, false))?,
            Command::ToggleAll => {
                let enabled = self.monitor.store().lock().toggle_all_alerts();
                info!(enabled, "toggled all alerts");
            }
            Command::Tolerance(symbol, tolerance) => {
                self.store_mut(|store| store.set_tolerance(&symbol, tolerance))?
            }
            Command::Digits(symbol, digits) => self.store_mut(|store| store.set_digits(&symbol, digits))?,
            Command::Add(symbol) => self.store_mut(|store| store.add(&symbol))?,
            Command::Remove(symbol) => self.monitor.remove(&symbol)?,
            Command::Up(symbol) => {
                if !self.monitor.store().lock().move_up(&symbol)? {
                    info!(%symbol, "already first");
                }
            }
            Command::Down(symbol) => {
                if !self.monitor.store().lock().move_down(&symbol)? {
                    info!(%symbol, "already last");
                }
            }
            Command::Save => self.save()?,
            Command::Status => self.print_status(),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// Reads commands until `quit` or end of input. Failed commands are
    /// logged and monitoring carries on.
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("failed to read operator input")? {
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(error) => {
                    warn!("{error}");
                    continue;
                }
            };

            match self.execute(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(error) => error!("command failed: {error:?}"),
            }
        }

        Ok(())
    }

    /// Stops monitoring and persists the product path and session selection.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.monitor.stop().await;
        self.config.save(&self.config_path)
    }

    fn store_mut(&self, edit: impl FnOnce(&mut ConfigStore) -> Result<()>) -> Result<()> {
        let mut store = self.monitor.store().lock();
        edit(&mut *store)
    }

    fn print_status(&self) {
        let state = if self.monitor.is_running() { "running" } else { "stopped" };
        println!("monitoring {state}");

        let statuses = self.monitor.statuses();
        if statuses.is_empty() {
            println!("no quotes evaluated yet");
        }
        for status in statuses {
            println!("{status}");
        }
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("running", &self.monitor.is_running())
            .field("config", &self.config)
            .finish()
    }
}
