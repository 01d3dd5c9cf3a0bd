use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// `name,filePath` lines mapping a session name to its parameter file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionCatalog {
    entries: Vec<(String, PathBuf)>,
}

impl SessionCatalog {
    /// A missing or unreadable file yields an empty catalog.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(error) => {
                warn!(path = %path.display(), "no session catalog loaded: {error}");
                Self::default()
            }
        }
    }

    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .lines()
            .map(str::trim)
            .filter_map(|line| line.split_once(','))
            .map(|(name, path)| (name.trim().to_string(), PathBuf::from(path.trim())))
            .filter(|(name, _)| !name.is_empty())
            .collect();

        Self { entries }
    }

    pub fn path_for(&self, name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, path)| path.as_path())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
