use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::Args;
use driftsync_engine::{FolderStatus, SyncEngine, SyncOptions};

use crate::commands::{
    OutputOptions, ReconcileOptions, StoreOptions, report_error, require_folder,
};

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Local folder to check
    pub folder: PathBuf,

    /// Exit with status 1 when any file is out of sync
    #[arg(long)]
    pub check: bool,

    #[command(flatten)]
    pub store: StoreOptions,

    #[command(flatten)]
    pub reconcile: ReconcileOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: StatusArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            report_error("status", &e);
            ExitCode::from(2)
        }
    }
}

pub(super) fn execute(args: StatusArgs) -> Result<ExitCode> {
    let skew = args.reconcile.skew()?;

    let status = if require_folder(&args.folder).is_err() {
        FolderStatus::Missing
    } else {
        let (store, session) = args.store.connect()?;
        let engine = SyncEngine::new(&store, &session).options(SyncOptions {
            skew,
            ..SyncOptions::default()
        });
        engine.status(&args.folder)?
    };

    args.output.make_printer().status(&args.folder, status)?;

    Ok(exit_code(status, args.check))
}

/// A missing folder is always a soft failure; drift only with `--check`.
pub fn exit_code(status: FolderStatus, check: bool) -> ExitCode {
    match status {
        FolderStatus::Missing => ExitCode::from(1),
        s if check && !s.is_in_sync() => ExitCode::from(1),
        FolderStatus::Drift(_) => ExitCode::SUCCESS,
    }
}
