use std::path::Path;

use chrono::TimeDelta;
use driftsync_fs::{LocalFilesystem, StdFilesystem};
use driftsync_model::{FileRecord, SyncAction, SyncReport};
use driftsync_store::{RemoteStore, Session};
use log::{debug, info};

use crate::{
    CancellationToken, FolderStatus, ProgressSink,
    error::{Result, SyncError},
    executor::{Executor, FailurePolicy},
    progress::Listeners,
    reconcile::{default_skew, reconcile},
    status::status,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Timestamps closer than this are treated as equal.
    pub skew: TimeDelta,
    pub policy: FailurePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            skew: default_skew(),
            policy: FailurePolicy::default(),
        }
    }
}

/// Synchronizes local folders against one remote store session.
///
/// Every call snapshots both sides afresh; nothing is carried between runs.
/// The engine does not guard against two runs on the same folder at once.
pub struct SyncEngine<'a, S: ?Sized, F = StdFilesystem> {
    store: &'a S,
    session: &'a Session,
    local: F,
    options: SyncOptions,
    cancel: Option<CancellationToken>,
    listeners: Listeners<'a>,
}

impl<'a, S> SyncEngine<'a, S>
where
    S: RemoteStore + ?Sized,
{
    pub fn new(store: &'a S, session: &'a Session) -> Self {
        Self::with_local(store, session, StdFilesystem)
    }
}

impl<'a, S, F> SyncEngine<'a, S, F>
where
    S: RemoteStore + ?Sized,
    F: LocalFilesystem,
{
    pub fn with_local(store: &'a S, session: &'a Session, local: F) -> Self {
        Self {
            store,
            session,
            local,
            options: SyncOptions::default(),
            cancel: None,
            listeners: Listeners::new(),
        }
    }

    pub fn options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Add a progress listener for later `sync` calls.
    pub fn subscribe(&mut self, sink: impl ProgressSink + 'a) {
        self.listeners.subscribe(sink);
    }

    /// Snapshot both sides. The local folder is checked before the remote
    /// store is contacted.
    fn snapshot(&self, folder: &Path) -> Result<(Vec<FileRecord>, Vec<FileRecord>)> {
        if !self.local.is_dir(folder) {
            return Err(SyncError::FolderNotFound {
                path: folder.to_path_buf(),
            });
        }

        let local = self.local.scan(folder).map_err(|source| SyncError::Scan {
            path: folder.to_path_buf(),
            source,
        })?;
        let remote = self.store.list_files(self.session)?;
        debug!(
            "[sync] snapshot of {}: {} local, {} remote",
            folder.display(),
            local.len(),
            remote.len()
        );

        Ok((local, remote))
    }

    /// Compute the actions a sync of `folder` would apply, without applying
    /// them.
    pub fn plan(&self, folder: &Path) -> Result<Vec<SyncAction>> {
        let (local, remote) = self.snapshot(folder)?;
        Ok(reconcile(&local, &remote, self.options.skew))
    }

    /// Reconcile `folder` with the remote store and apply the result.
    pub fn sync(&mut self, folder: &Path) -> Result<SyncReport> {
        let actions = self.plan(folder)?;
        info!(
            "[sync] {}: {} actions ({} pending)",
            folder.display(),
            actions.len(),
            actions.iter().filter(|a| !a.is_noop()).count()
        );

        let mut executor = Executor::new(self.store, self.session, &self.local)
            .policy(self.options.policy);
        if let Some(token) = &self.cancel {
            executor = executor.cancel_on(token.clone());
        }

        executor.execute(&actions, folder, &mut self.listeners)
    }

    /// Count shared files that drifted apart. A missing folder is reported as
    /// [`FolderStatus::Missing`] without contacting the remote store.
    pub fn status(&self, folder: &Path) -> Result<FolderStatus> {
        match self.snapshot(folder) {
            Ok((local, remote)) => Ok(FolderStatus::Drift(status(
                &local,
                &remote,
                self.options.skew,
            ))),
            Err(SyncError::FolderNotFound { .. }) => Ok(FolderStatus::Missing),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
