//! Remote side of a sync: the [`RemoteStore`] contract and a folder-backed
//! implementation.

mod error;
mod folder;
mod sidecar;

use std::{io::Read, path::Path};

use driftsync_model::FileRecord;

pub use error::{Result, StoreError};
pub use folder::FolderStore;

/// Credentials handed out by [`RemoteStore::authenticate`].
///
/// Callers pass the session explicitly on every call; stores only check that
/// they issued the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: String,
}

/// A remote file namespace.
///
/// `remote_path` values are opaque locators taken from
/// [`FileRecord::remote_path`] of a record this store produced.
pub trait RemoteStore {
    fn authenticate(&self, user: &str, password: &str) -> Result<Session>;

    /// All files in the store, sorted by name.
    fn list_files(&self, session: &Session) -> Result<Vec<FileRecord>>;

    fn read_file(&self, session: &Session, remote_path: &str) -> Result<Box<dyn Read>>;

    /// Store the file at `local_path` under its file name, replacing any
    /// file of the same name.
    fn write_file(
        &self,
        session: &Session,
        local_path: &Path,
        uploaded_by: &str,
    ) -> Result<FileRecord>;

    /// Returns `false` when nothing was stored at `remote_path`.
    fn delete_file(&self, session: &Session, remote_path: &str) -> Result<bool>;

    fn get_metadata(&self, session: &Session, remote_path: &str) -> Result<FileRecord>;

    fn exists(&self, session: &Session, remote_path: &str) -> Result<bool>;
}
