use std::{
    io,
    path::{Component, Path, PathBuf},
};

use driftsync_fs::LocalFilesystem;
use driftsync_model::{FailedFile, FileRecord, SyncAction, SyncReport};
use driftsync_store::{RemoteStore, Session};
use log::{debug, info, warn};

use crate::{
    CancellationToken,
    error::{ActionError, Result, SyncError},
    progress::{Listeners, Progress},
};

/// What to do when a single upload or download fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the run at the first failing action and return its error.
    #[default]
    FailFast,
    /// Record the failure in the report and carry on with the next action.
    /// Authentication failures still abort.
    BestEffort,
}

/// Applies reconciled actions one at a time, in order.
pub struct Executor<'a, S: ?Sized, F: ?Sized> {
    store: &'a S,
    session: &'a Session,
    local: &'a F,
    policy: FailurePolicy,
    cancel: Option<CancellationToken>,
}

impl<'a, S, F> Executor<'a, S, F>
where
    S: RemoteStore + ?Sized,
    F: LocalFilesystem + ?Sized,
{
    pub fn new(store: &'a S, session: &'a Session, local: &'a F) -> Self {
        Self {
            store,
            session,
            local,
            policy: FailurePolicy::default(),
            cancel: None,
        }
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Apply `actions` against `local_folder`.
    ///
    /// Listeners get a start event, one event per upload or download and a
    /// final summary. `NoOp` actions are skipped silently. Uploads are
    /// attributed to the session's user.
    pub fn execute(
        &self,
        actions: &[SyncAction],
        local_folder: &Path,
        listeners: &mut Listeners<'_>,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        listeners.emit(&Progress::Started);

        for action in actions.iter().filter(|a| !a.is_noop()) {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                info!("[sync] cancellation requested, stopping before {}", action.name());
                report.cancelled = true;
                break;
            }

            match self.apply(action, local_folder) {
                Ok(()) => {
                    let kind = action.kind();
                    if kind.is_upload() {
                        report.uploaded += 1;
                    } else if kind.is_download() {
                        report.downloaded += 1;
                    }
                    debug!("[sync] {} {}", action.kind(), action.name());
                    listeners.emit(&Progress::Applied {
                        kind: action.kind(),
                        name: action.name().to_owned(),
                    });
                }
                Err(source) => {
                    let name = action.name().to_owned();
                    warn!("[sync] {} {} failed: {source}", action.kind(), name);
                    listeners.emit(&Progress::Failed {
                        name: name.clone(),
                        error: source.to_string(),
                    });

                    if self.policy == FailurePolicy::FailFast || source.is_fatal() {
                        return Err(SyncError::Action { name, source });
                    }
                    report.failed.push(FailedFile {
                        name,
                        error: source.to_string(),
                    });
                }
            }
        }

        report.summarize();
        info!("[sync] {}", report.summary);
        listeners.emit(&Progress::Finished(report.clone()));

        Ok(report)
    }

    fn apply(&self, action: &SyncAction, folder: &Path) -> std::result::Result<(), ActionError> {
        match action {
            SyncAction::UploadNew(record) | SyncAction::UploadUpdate(record) => {
                let path = local_path(folder, &record.name)?;
                self.store
                    .write_file(self.session, &path, &self.session.user)?;
                Ok(())
            }
            SyncAction::DownloadNew(record) | SyncAction::DownloadUpdate(record) => {
                self.download(record, folder)
            }
            SyncAction::NoOp(_) => Ok(()),
        }
    }

    fn download(&self, remote: &FileRecord, folder: &Path) -> std::result::Result<(), ActionError> {
        let remote_path = remote
            .remote_path
            .as_deref()
            .ok_or(ActionError::MissingLocator)?;

        let dest = local_path(folder, &remote.name)?;
        let mut stream = self.store.read_file(self.session, remote_path)?;
        self.local.write_atomic(&dest, &mut stream)?;

        // Until the mtime matches the remote record, the fresh copy looks
        // locally modified and the next run would upload it back.
        if let Err(e) = self.local.set_modified(&dest, remote.modified_at) {
            if let Err(rm) = self.local.remove_file(&dest) {
                warn!("[sync] could not remove {}: {rm}", dest.display());
            }
            return Err(e.into());
        }

        Ok(())
    }
}

/// Place a listing name inside `folder`. Names come from the remote store, so
/// anything but a single plain file name is refused.
fn local_path(folder: &Path, name: &str) -> io::Result<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(file_name)), None) => Ok(folder.join(file_name)),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing file name {name:?} outside the sync folder"),
        )),
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
