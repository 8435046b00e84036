use std::{
    collections::HashMap,
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
    sync::Mutex,
    time::SystemTime,
};

use chrono::Utc;
use driftsync_fs::{is_partial_name, partial_file, to_utc};
use driftsync_model::FileRecord;
use driftsync_runtime::SIDECAR_SUFFIX;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::{RemoteStore, Result, Session, StoreError, sidecar};

/// A [`RemoteStore`] kept in a single local directory.
///
/// Each stored file sits flat in `root` with a JSON sidecar
/// (`<name>.meta.json`) holding its identity and attribution. Remote paths are
/// the full paths of the stored files.
pub struct FolderStore {
    root: PathBuf,
    /// token -> user for every session this instance issued
    sessions: Mutex<HashMap<String, String>>,
}

impl FolderStore {
    /// Open the store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!("[store] opened folder store at {}", root.display());

        Ok(Self {
            root,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_session(&self, session: &Session) -> Result<()> {
        if session.token.trim().is_empty() {
            return Err(StoreError::Auth("missing session token".into()));
        }

        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        match sessions.get(&session.token) {
            Some(user) if *user == session.user => Ok(()),
            _ => Err(StoreError::Auth("unknown session token".into())),
        }
    }

    /// Map a remote path back onto a stored file. Anything outside the store
    /// root, or one of the store's own bookkeeping files, resolves to `None`.
    fn resolve(&self, remote_path: &str) -> Option<PathBuf> {
        let path = PathBuf::from(remote_path);
        let name = path.file_name()?.to_str()?;

        if path.parent() != Some(self.root.as_path()) || is_internal(name) {
            return None;
        }
        Some(path)
    }

    fn resolve_existing(&self, remote_path: &str) -> Result<PathBuf> {
        self.resolve(remote_path)
            .filter(|p| p.is_file())
            .ok_or_else(|| StoreError::NotFound {
                path: remote_path.to_owned(),
            })
    }

    /// Sidecar record for `path`, or one synthesized from filesystem stats
    /// attributed to `user`. The flag tells whether it was synthesized.
    fn record_for(&self, path: &Path, user: &str) -> Result<(FileRecord, bool)> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_owned();

        if let Some(mut record) = sidecar::load(path).filter(|r| r.name == name) {
            record.remote_path = Some(path.to_string_lossy().into_owned());
            return Ok((record, false));
        }

        let metadata = fs::metadata(path)?;
        let modified_at = to_utc(metadata.modified().ok());
        let created_at = metadata
            .created()
            .ok()
            .map(|t| to_utc(Some(t)))
            .unwrap_or(modified_at);

        let mut record = FileRecord::local(name, metadata.len(), created_at, modified_at);
        record.id = Some(Uuid::new_v4());
        record.uploaded_by = Some(user.to_owned());
        record.edited_by = Some(user.to_owned());
        record.remote_path = Some(path.to_string_lossy().into_owned());

        Ok((record, true))
    }
}

fn is_internal(name: &str) -> bool {
    name.ends_with(SIDECAR_SUFFIX) || is_partial_name(name)
}

impl RemoteStore for FolderStore {
    fn authenticate(&self, user: &str, _password: &str) -> Result<Session> {
        if user.trim().is_empty() {
            return Err(StoreError::Auth("user name required".into()));
        }

        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.clone(), user.to_owned());

        info!("[store] issued session for {user}");
        Ok(Session {
            token,
            user: user.to_owned(),
        })
    }

    fn list_files(&self, session: &Session) -> Result<Vec<FileRecord>> {
        self.ensure_session(session)?;

        let mut records = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!("[store] skipping non UTF-8 name {:?}", entry.file_name());
                continue;
            };
            if is_internal(&name) || !path.is_file() {
                continue;
            }

            let (record, synthesized) = self.record_for(&path, &session.user)?;
            if synthesized && let Err(e) = sidecar::save(&path, &record) {
                warn!("[store] could not persist sidecar for {name}: {e}");
            }
            records.push(record);
        }

        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn read_file(&self, session: &Session, remote_path: &str) -> Result<Box<dyn Read>> {
        self.ensure_session(session)?;
        let path = self.resolve_existing(remote_path)?;
        Ok(Box::new(File::open(path)?))
    }

    fn write_file(
        &self,
        session: &Session,
        local_path: &Path,
        uploaded_by: &str,
    ) -> Result<FileRecord> {
        self.ensure_session(session)?;

        let name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !is_internal(n))
            .ok_or_else(|| {
                StoreError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("cannot store {}", local_path.display()),
                ))
            })?
            .to_owned();

        let mut src = File::open(local_path)?;
        let local_meta = src.metadata()?;
        let modified_at = to_utc(local_meta.modified().ok());

        let dest = self.root.join(&name);
        let previous = sidecar::load(&dest).filter(|r| r.name == name);

        let mut tmp = partial_file(&dest)?;
        let size = io::copy(&mut src, tmp.as_file_mut())?;
        // The stored copy keeps the uploader's mtime so a later listing of a
        // store without sidecars still agrees with the local file.
        tmp.as_file().set_modified(SystemTime::from(modified_at))?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;

        let mut record = FileRecord::local(name, size, Utc::now(), modified_at);
        record.remote_path = Some(dest.to_string_lossy().into_owned());
        record.edited_by = Some(uploaded_by.to_owned());
        match previous {
            Some(prev) => {
                record.id = prev.id.or_else(|| Some(Uuid::new_v4()));
                record.created_at = prev.created_at;
                record.uploaded_by = prev.uploaded_by.or_else(|| Some(uploaded_by.to_owned()));
            }
            None => {
                record.id = Some(Uuid::new_v4());
                record.uploaded_by = Some(uploaded_by.to_owned());
            }
        }

        sidecar::save(&dest, &record)?;
        debug!("[store] stored {} ({} bytes)", record.name, size);

        Ok(record)
    }

    fn delete_file(&self, session: &Session, remote_path: &str) -> Result<bool> {
        self.ensure_session(session)?;

        let Some(path) = self.resolve(remote_path).filter(|p| p.is_file()) else {
            return Ok(false);
        };

        fs::remove_file(&path)?;
        sidecar::remove(&path)?;
        info!("[store] deleted {}", path.display());
        Ok(true)
    }

    fn get_metadata(&self, session: &Session, remote_path: &str) -> Result<FileRecord> {
        self.ensure_session(session)?;
        let path = self.resolve_existing(remote_path)?;
        let (record, _) = self.record_for(&path, &session.user)?;
        Ok(record)
    }

    fn exists(&self, session: &Session, remote_path: &str) -> Result<bool> {
        self.ensure_session(session)?;
        Ok(self.resolve(remote_path).is_some_and(|p| p.is_file()))
    }
}

#[cfg(test)]
#[path = "folder_tests.rs"]
mod tests;
