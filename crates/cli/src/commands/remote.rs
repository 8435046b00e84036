use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use driftsync_fs::{LocalFilesystem, StdFilesystem};
use driftsync_store::{FolderStore, RemoteStore};

use crate::commands::{OutputOptions, StoreOptions, report_error};

#[derive(Debug, Args)]
pub struct RemoteArgs {
    #[command(subcommand)]
    pub action: RemoteAction,

    #[command(flatten)]
    pub store: StoreOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

#[derive(Debug, Subcommand)]
pub enum RemoteAction {
    /// List every file in the store.
    List,
    /// Show the metadata of one file.
    Info { name: String },
    /// Remove a file and its metadata.
    Delete { name: String },
    /// Copy a local file into the store.
    Upload { file: PathBuf },
    /// Copy a stored file to `dest`, keeping its modification time.
    Download { name: String, dest: PathBuf },
}

pub fn run(args: RemoteArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            report_error("remote", &e);
            ExitCode::from(2)
        }
    }
}

fn execute(args: RemoteArgs) -> Result<ExitCode> {
    let (store, session) = args.store.connect()?;
    let mut printer = args.output.make_printer();

    match args.action {
        RemoteAction::List => {
            let records = store.list_files(&session)?;
            printer.records(&records)?;
        }
        RemoteAction::Info { name } => {
            let locator = locator(&store, &name);
            if !store.exists(&session, &locator)? {
                return not_found(&name);
            }
            let record = store.get_metadata(&session, &locator)?;
            printer.records(std::slice::from_ref(&record))?;
        }
        RemoteAction::Delete { name } => {
            if !store.delete_file(&session, &locator(&store, &name))? {
                return not_found(&name);
            }
            printer.note("deleted", &format!("Deleted {name}"))?;
        }
        RemoteAction::Upload { file } => {
            let record = store
                .write_file(&session, &file, &session.user)
                .with_context(|| format!("failed to upload {}", file.display()))?;
            printer.note(
                "uploaded",
                &format!("Uploaded {} ({} bytes)", record.name, record.size),
            )?;
        }
        RemoteAction::Download { name, dest } => {
            let locator = locator(&store, &name);
            if !store.exists(&session, &locator)? {
                return not_found(&name);
            }
            let record = store.get_metadata(&session, &locator)?;
            let target = if dest.is_dir() { dest.join(&name) } else { dest };

            let mut reader = store.read_file(&session, &locator)?;
            let fs = StdFilesystem;
            let bytes = fs
                .write_atomic(&target, &mut reader)
                .with_context(|| format!("failed to write {}", target.display()))?;
            fs.set_modified(&target, record.modified_at)
                .with_context(|| format!("failed to set mtime on {}", target.display()))?;

            printer.note(
                "downloaded",
                &format!("Downloaded {name} to {} ({bytes} bytes)", target.display()),
            )?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Folder stores address files by their path under the store root.
fn locator(store: &FolderStore, name: &str) -> String {
    store.root().join(name).to_string_lossy().into_owned()
}

fn not_found(name: &str) -> Result<ExitCode> {
    eprintln!("[remote] no such file: {name}");
    Ok(ExitCode::from(1))
}
