use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::Args;
use driftsync_engine::{SyncEngine, SyncError};

use crate::commands::{
    OutputOptions, ReconcileOptions, StoreOptions, report_error, require_folder,
};

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Local folder to compare with the remote store
    pub folder: PathBuf,

    #[command(flatten)]
    pub store: StoreOptions,

    #[command(flatten)]
    pub reconcile: ReconcileOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: PlanArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            report_error("plan", &e);
            ExitCode::from(2)
        }
    }
}

pub(super) fn execute(args: PlanArgs) -> Result<ExitCode> {
    let options = args.reconcile.sync_options(false)?;
    if let Err(e) = require_folder(&args.folder) {
        eprintln!("[plan] {e}");
        return Ok(ExitCode::from(1));
    }
    let (store, session) = args.store.connect()?;

    let engine = SyncEngine::new(&store, &session).options(options);
    let actions = match engine.plan(&args.folder) {
        Ok(actions) => actions,
        Err(e @ SyncError::FolderNotFound { .. }) => {
            eprintln!("[plan] {e}");
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e.into()),
    };

    args.output.make_printer().actions(&actions)?;

    Ok(ExitCode::SUCCESS)
}
