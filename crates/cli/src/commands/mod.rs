pub mod history;
pub mod plan;
pub mod remote;
pub mod status;
pub mod sync;

use std::{
    io::{Stderr, Stdout},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::TimeDelta;
use clap::{Args, Subcommand};
use driftsync_engine::{FailurePolicy, SyncError, SyncOptions};
use driftsync_runtime::{DEFAULT_SKEW_MS, default_store_dir};
use driftsync_store::{FolderStore, RemoteStore, Session};
use log::debug;

pub use history::HistoryArgs;
pub use plan::PlanArgs;
pub use remote::RemoteArgs;
pub use status::StatusArgs;
pub use sync::SyncArgs;

use crate::printer::{
    ColorChoice, HumanPrinter, JsonPrinter, OutputFormat, Printer, PrinterConfig,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Two-way sync of a local folder with the remote store.
    ///
    /// Example:
    ///   driftsync sync ~/Documents/shared
    ///   driftsync sync --best-effort --skew-ms 2000 ~/Documents/shared
    Sync(SyncArgs),

    /// Show what a sync would do without transferring anything.
    Plan(PlanArgs),

    /// Count files whose local and remote copies drifted apart.
    ///
    /// Example:
    ///   driftsync status --check ~/Documents/shared
    Status(StatusArgs),

    /// Inspect and edit the remote store directly.
    Remote(RemoteArgs),

    /// Show past sync runs.
    History(HistoryArgs),
}

/// Where the remote store lives and who is talking to it.
#[derive(Debug, Args)]
pub struct StoreOptions {
    /// Remote store directory [default: $XDG_DATA_HOME/driftsync/store]
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// User name recorded as uploader and editor
    #[arg(long, short = 'u', env = "DRIFTSYNC_USER", default_value = "anonymous")]
    pub user: String,

    #[arg(long, env = "DRIFTSYNC_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,
}

impl StoreOptions {
    pub fn store_dir(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(default_store_dir)
    }

    /// Open the store and log in.
    pub fn connect(&self) -> Result<(FolderStore, Session)> {
        let dir = self.store_dir();
        let store = FolderStore::open(&dir)
            .with_context(|| format!("failed to open store at {}", dir.display()))?;
        let session = store
            .authenticate(&self.user, &self.password)
            .with_context(|| format!("failed to log in as {:?}", self.user))?;
        debug!("[store] {} as {}", dir.display(), session.user);

        Ok((store, session))
    }
}

/// Knobs shared by every command that reconciles.
#[derive(Debug, Args)]
pub struct ReconcileOptions {
    /// Timestamps closer than this many milliseconds count as equal
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_SKEW_MS)]
    pub skew_ms: u64,
}

impl ReconcileOptions {
    pub fn skew(&self) -> Result<TimeDelta> {
        i64::try_from(self.skew_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .with_context(|| format!("--skew-ms {} is out of range", self.skew_ms))
    }

    pub fn sync_options(&self, best_effort: bool) -> Result<SyncOptions> {
        let policy = if best_effort {
            FailurePolicy::BestEffort
        } else {
            FailurePolicy::FailFast
        };

        Ok(SyncOptions {
            skew: self.skew()?,
            policy,
        })
    }
}

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Output as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: String,
}

impl OutputOptions {
    pub fn make_printer(&self) -> Box<dyn Printer> {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        };

        let color = match self.color.as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        };

        match format {
            OutputFormat::Human => {
                Box::new(HumanPrinter::<Stdout, Stderr>::stdout(PrinterConfig { color }))
            }
            OutputFormat::Json => Box::new(JsonPrinter::<Stdout>::stdout()),
        }
    }
}

/// The local folder must exist before the store is opened or contacted.
pub fn require_folder(folder: &Path) -> std::result::Result<(), SyncError> {
    if folder.is_dir() {
        Ok(())
    } else {
        Err(SyncError::FolderNotFound {
            path: folder.to_path_buf(),
        })
    }
}

/// Print a command failure on stderr.
pub fn report_error(command: &str, err: &anyhow::Error) {
    debug!("[{command}] {err:?}");
    eprintln!("[{command}] {err:#}");
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
