use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedKind {
    Snapshot,
    Bridge,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot => write!(f, "snapshot"),
            Self::Bridge => write!(f, "bridge"),
        }
    }
}

impl FromStr for FeedKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "snapshot" | "file" => Ok(Self::Snapshot),
            "bridge" | "ws" | "websocket" => Ok(Self::Bridge),
            other => Err(anyhow!("unknown feed kind: {other}")),
        }
    }
}
