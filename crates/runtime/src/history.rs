use std::{
    env,
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PROGRAM_NAME;

pub const HISTORY_VERSION: u8 = 1;

pub const HISTORY_DISABLED_ENV: &str = "DRIFTSYNC_HISTORY";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum HistoryEvent {
    Sync(SyncEvent),
}

/// One finished (or aborted) sync run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncEvent {
    /// Schema version
    pub version: u8,

    pub timestamp: DateTime<Utc>,

    /// Local folder that was synchronized
    pub folder: String,

    pub uploaded: usize,
    pub downloaded: usize,

    /// Names of files that failed under the best-effort policy
    #[serde(default)]
    pub failed: Vec<String>,

    #[serde(default)]
    pub cancelled: bool,

    /// Error that aborted the run, if any
    #[serde(default)]
    pub error: Option<String>,

    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u32,
}

impl SyncEvent {
    pub fn new(folder: String, uploaded: usize, downloaded: usize, duration_ms: u32) -> Self {
        Self {
            version: HISTORY_VERSION,
            timestamp: Utc::now(),
            folder,
            uploaded,
            downloaded,
            failed: Vec::new(),
            cancelled: false,
            error: None,
            duration_ms,
        }
    }

    pub fn aborted(folder: String, error: String, duration_ms: u32) -> Self {
        Self {
            error: Some(error),
            ..Self::new(folder, 0, 0, duration_ms)
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.failed.is_empty() && !self.cancelled
    }
}

pub struct HistoryStore {
    path: PathBuf,
}

pub fn state_dir() -> Option<PathBuf> {
    // Check XDG_STATE_HOME first (Linux)
    if let Ok(xdg_state) = env::var("XDG_STATE_HOME")
        && !xdg_state.is_empty()
    {
        return Some(PathBuf::from(xdg_state).join(PROGRAM_NAME));
    }

    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|p| p.join(PROGRAM_NAME))
}

pub fn history_log_path() -> Option<PathBuf> {
    state_dir().map(|d| d.join("history.log"))
}

fn history_disabled() -> bool {
    match env::var(HISTORY_DISABLED_ENV) {
        Ok(val) => val == "0" || val.eq_ignore_ascii_case("false"),
        Err(_) => false,
    }
}

impl HistoryStore {
    pub fn new() -> Option<Self> {
        if history_disabled() {
            return None;
        }

        let path = history_log_path()?;
        Some(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best effort: failures are logged at debug level and otherwise ignored.
    pub fn log_sync(&self, event: SyncEvent) {
        if let Err(e) = self.append_event(&HistoryEvent::Sync(event)) {
            debug!("Failed to log history event: {}", e);
        }
    }

    fn append_event(&self, event: &HistoryEvent) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_string(event).map_err(io::Error::other)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // One JSON line per write; O_APPEND keeps concurrent appenders from
        // interleaving in the common case.
        file.write_all(line.as_bytes())?;

        Ok(())
    }

    pub fn iter_events(&self) -> impl Iterator<Item = HistoryEvent> {
        self.read_events().into_iter().flatten()
    }

    fn read_events(&self) -> Option<Vec<HistoryEvent>> {
        let file = File::open(&self.path).ok()?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();
        for line in reader.lines() {
            match line {
                Ok(line) => match serde_json::from_str(&line) {
                    Ok(ev) => events.push(ev),
                    Err(e) => debug!("Skipping malformed history line: {e}"),
                },
                Err(e) => {
                    debug!("Error reading history log: {e}");
                    break;
                }
            }
        }
        Some(events)
    }

    /// Most recent runs first.
    pub fn recent_syncs(&self, limit: usize) -> Vec<SyncEvent> {
        let mut runs: Vec<SyncEvent> = self
            .iter_events()
            .map(|e| match e {
                HistoryEvent::Sync(s) => s,
            })
            .collect();

        runs.reverse();
        runs.truncate(limit);
        runs
    }

    pub fn count(&self) -> usize {
        self.iter_events().count()
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
