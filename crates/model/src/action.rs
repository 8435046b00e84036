use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FileRecord;

/// A single reconciliation decision for one file name.
///
/// Upload variants carry the local record, download variants the remote one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "file", rename_all = "snake_case")]
pub enum SyncAction {
    /// Local file has no remote counterpart
    UploadNew(FileRecord),
    /// Local copy is newer than the remote one by more than the skew
    UploadUpdate(FileRecord),
    /// Remote file has no local counterpart
    DownloadNew(FileRecord),
    /// Remote copy is newer than the local one by more than the skew
    DownloadUpdate(FileRecord),
    /// Both sides agree within the skew
    NoOp(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    UploadNew,
    UploadUpdate,
    DownloadNew,
    DownloadUpdate,
    NoOp,
}

impl SyncAction {
    pub fn name(&self) -> &str {
        match self {
            SyncAction::UploadNew(r)
            | SyncAction::UploadUpdate(r)
            | SyncAction::DownloadNew(r)
            | SyncAction::DownloadUpdate(r) => &r.name,
            SyncAction::NoOp(name) => name,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            SyncAction::UploadNew(_) => ActionKind::UploadNew,
            SyncAction::UploadUpdate(_) => ActionKind::UploadUpdate,
            SyncAction::DownloadNew(_) => ActionKind::DownloadNew,
            SyncAction::DownloadUpdate(_) => ActionKind::DownloadUpdate,
            SyncAction::NoOp(_) => ActionKind::NoOp,
        }
    }

    /// The record the action transfers, `None` for `NoOp`.
    pub fn record(&self) -> Option<&FileRecord> {
        match self {
            SyncAction::UploadNew(r)
            | SyncAction::UploadUpdate(r)
            | SyncAction::DownloadNew(r)
            | SyncAction::DownloadUpdate(r) => Some(r),
            SyncAction::NoOp(_) => None,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, SyncAction::NoOp(_))
    }
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::UploadNew => "upload-new",
            ActionKind::UploadUpdate => "upload-update",
            ActionKind::DownloadNew => "download-new",
            ActionKind::DownloadUpdate => "download-update",
            ActionKind::NoOp => "noop",
        }
    }

    pub fn is_upload(self) -> bool {
        matches!(self, ActionKind::UploadNew | ActionKind::UploadUpdate)
    }

    pub fn is_download(self) -> bool {
        matches!(self, ActionKind::DownloadNew | ActionKind::DownloadUpdate)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
