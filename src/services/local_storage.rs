//! Best-effort local key-value storage
//!
//! A flat JSON object of string keys to string values, kept in memory and
//! rewritten to disk on every change. Nothing here is allowed to fail the
//! caller: unreadable files load as empty and failed writes are logged.

use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub const WORK_DURATION_KEY: &str = "work-duration";
pub const SHORT_BREAK_DURATION_KEY: &str = "short-break-duration";
pub const LONG_BREAK_DURATION_KEY: &str = "long-break-duration";
pub const ACCENT_COLOR_KEY: &str = "accent-color";
pub const FONT_KEY: &str = "font";

/// String key-value store backed by an optional file
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Default storage file under the user's local data directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("pomodoro-timer").join("storage.json"))
    }

    /// Open the store at `path`, starting empty if it is missing or malformed
    pub fn open(path: &Path) -> Self {
        let entries = match read_entries(path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring local storage at {}: {:#}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!("Loaded {} local storage entries from {}", entries.len(), path.display());

        Self {
            path: Some(path.to_path_buf()),
            entries,
        }
    }

    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Read a value as a number, `None` if absent or not numeric
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|value| value.trim().parse().ok())
    }

    /// Store a value and write the whole store back to disk
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
        if let Err(e) = self.flush() {
            warn!("Failed to persist local storage: {:#}", e);
        }
    }

    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage directory: {}", parent.display()))?;
        }

        let content =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize local storage")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write local storage: {}", path.display()))
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read local storage: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&content).context("Failed to parse local storage JSON")
}
