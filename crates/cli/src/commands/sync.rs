use std::{path::PathBuf, process::ExitCode, time::Instant};

use anyhow::{Context, Result};
use clap::Args;
use driftsync_engine::{
    CancellationToken, Progress, ProgressSink, SyncEngine, SyncError, SyncOptions,
};
use driftsync_model::SyncReport;
use driftsync_runtime::history::{HistoryStore, SyncEvent};
use log::{info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use crate::commands::{
    OutputOptions, ReconcileOptions, StoreOptions, report_error, require_folder,
};

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Local folder to synchronize
    pub folder: PathBuf,

    /// Keep going after a failed transfer and report failures at the end
    #[arg(long)]
    pub best_effort: bool,

    #[command(flatten)]
    pub store: StoreOptions,

    #[command(flatten)]
    pub reconcile: ReconcileOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: SyncArgs) -> ExitCode {
    match execute(args, HistoryStore::new()) {
        Ok(code) => code,
        Err(e) => {
            report_error("sync", &e);
            ExitCode::from(2)
        }
    }
}

pub(super) fn execute(args: SyncArgs, history: Option<HistoryStore>) -> Result<ExitCode> {
    let options = args.reconcile.sync_options(args.best_effort)?;
    let started = Instant::now();

    let result = match require_folder(&args.folder) {
        Ok(()) => sync_with_store(&args, options)?,
        Err(e) => Err(e),
    };

    let duration_ms = u32::try_from(started.elapsed().as_millis()).unwrap_or(u32::MAX);
    let folder = args.folder.display().to_string();

    match result {
        Ok(report) => {
            if let Some(history) = &history {
                history.log_sync(event_for(folder, &report, duration_ms));
            }

            if report.is_clean() {
                info!("[sync] finished in {duration_ms}ms");
                Ok(ExitCode::SUCCESS)
            } else {
                warn!("[sync] {}", report.summary);
                Ok(ExitCode::from(1))
            }
        }
        Err(e) => {
            if let Some(history) = &history {
                history.log_sync(SyncEvent::aborted(folder, e.to_string(), duration_ms));
            }

            match e {
                SyncError::FolderNotFound { .. } => {
                    eprintln!("[sync] {e}");
                    Ok(ExitCode::from(1))
                }
                e => Err(e.into()),
            }
        }
    }
}

/// Open the store and run the engine. Failing to reach the store is an error
/// of its own; the run's outcome is returned as is.
fn sync_with_store(
    args: &SyncArgs,
    options: SyncOptions,
) -> Result<std::result::Result<SyncReport, SyncError>> {
    let (store, session) = args.store.connect()?;

    // Signals only flip the token; the run stops between two transfers.
    let cancel = CancellationToken::new();
    for sig in [SIGINT, SIGTERM] {
        flag::register(sig, cancel.flag())
            .with_context(|| format!("Failed to register signal handler for {sig}"))?;
    }

    let mut printer = args.output.make_printer();
    let mut engine = SyncEngine::new(&store, &session)
        .options(options)
        .cancel_on(cancel);
    engine.subscribe(|event: &Progress| printer.on_progress(event));

    Ok(engine.sync(&args.folder))
}

fn event_for(folder: String, report: &SyncReport, duration_ms: u32) -> SyncEvent {
    SyncEvent {
        failed: report.failed.iter().map(|f| f.name.clone()).collect(),
        cancelled: report.cancelled,
        ..SyncEvent::new(folder, report.uploaded, report.downloaded, duration_ms)
    }
}
