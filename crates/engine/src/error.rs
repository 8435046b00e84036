use std::{io, path::PathBuf};

use driftsync_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The local folder is missing. Raised before the remote store is contacted.
    #[error("local folder not found: {}", path.display())]
    FolderNotFound { path: PathBuf },

    #[error("failed to scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A single upload or download failed and the run was aborted.
    #[error("{name}: {source}")]
    Action {
        name: String,
        #[source]
        source: ActionError,
    },
}

/// Why applying one action failed.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("local I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("remote record carries no locator")]
    MissingLocator,
}

impl ActionError {
    /// Errors that make every remaining action fail the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ActionError::Store(StoreError::Auth(_)))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
