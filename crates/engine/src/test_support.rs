//! Shared fixtures for engine tests: timestamps, records and an in-memory
//! remote store with failure injection.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashSet},
    fs,
    io::{self, Cursor, Read},
    path::Path,
};

use chrono::{DateTime, TimeZone, Utc};
use driftsync_fs::to_utc;
use driftsync_model::FileRecord;
use driftsync_store::{RemoteStore, Result, Session, StoreError};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn local(name: &str, modified_at: DateTime<Utc>) -> FileRecord {
    FileRecord::local(name, 1, modified_at, modified_at)
}

pub fn remote(name: &str, modified_at: DateTime<Utc>) -> FileRecord {
    let mut record = FileRecord::local(name, 1, modified_at, modified_at);
    record.remote_path = Some(locator(name));
    record.uploaded_by = Some("remote".into());
    record.edited_by = Some("remote".into());
    record
}

fn locator(name: &str) -> String {
    format!("mem://{name}")
}

#[derive(Default)]
pub struct MemoryStore {
    files: RefCell<BTreeMap<String, (FileRecord, Vec<u8>)>>,
    calls: RefCell<Vec<String>>,
    fail_reads: RefCell<HashSet<String>>,
    fail_writes: RefCell<HashSet<String>>,
    revoked: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, name: &str, body: &[u8], modified_at: DateTime<Utc>) {
        let mut record = remote(name, modified_at);
        record.size = body.len() as u64;
        self.files
            .borrow_mut()
            .insert(name.to_owned(), (record, body.to_vec()));
    }

    pub fn body(&self, name: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(name).map(|(_, b)| b.clone())
    }

    pub fn record(&self, name: &str) -> Option<FileRecord> {
        self.files.borrow().get(name).map(|(r, _)| r.clone())
    }

    pub fn fail_read(&self, name: &str) {
        self.fail_reads.borrow_mut().insert(name.to_owned());
    }

    pub fn fail_write(&self, name: &str) {
        self.fail_writes.borrow_mut().insert(name.to_owned());
    }

    /// Make every later call fail authentication.
    pub fn revoke(&self) {
        self.revoked.set(true);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn enter(&self, call: &str) -> Result<()> {
        self.calls.borrow_mut().push(call.to_owned());
        if self.revoked.get() {
            return Err(StoreError::Auth("session revoked".into()));
        }
        Ok(())
    }

    fn name_of(remote_path: &str) -> Option<&str> {
        remote_path.strip_prefix("mem://")
    }
}

impl RemoteStore for MemoryStore {
    fn authenticate(&self, user: &str, _password: &str) -> Result<Session> {
        self.enter("authenticate")?;
        if user.is_empty() {
            return Err(StoreError::Auth("user name required".into()));
        }
        Ok(Session {
            token: "memory-token".into(),
            user: user.to_owned(),
        })
    }

    fn list_files(&self, _session: &Session) -> Result<Vec<FileRecord>> {
        self.enter("list_files")?;
        Ok(self
            .files
            .borrow()
            .values()
            .map(|(r, _)| r.clone())
            .collect())
    }

    fn read_file(&self, _session: &Session, remote_path: &str) -> Result<Box<dyn Read>> {
        self.enter("read_file")?;
        let name = Self::name_of(remote_path).unwrap_or(remote_path);
        if self.fail_reads.borrow().contains(name) {
            return Err(StoreError::Io(io::Error::other("injected read failure")));
        }
        let body = self.body(name).ok_or_else(|| StoreError::NotFound {
            path: remote_path.to_owned(),
        })?;
        Ok(Box::new(Cursor::new(body)))
    }

    fn write_file(
        &self,
        _session: &Session,
        local_path: &Path,
        uploaded_by: &str,
    ) -> Result<FileRecord> {
        self.enter("write_file")?;
        let name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_owned();
        if self.fail_writes.borrow().contains(&name) {
            return Err(StoreError::Io(io::Error::other("injected write failure")));
        }

        let body = fs::read(local_path)?;
        let modified_at = to_utc(fs::metadata(local_path)?.modified().ok());

        let mut record = remote(&name, modified_at);
        record.size = body.len() as u64;
        record.uploaded_by = Some(uploaded_by.to_owned());
        record.edited_by = Some(uploaded_by.to_owned());
        self.files
            .borrow_mut()
            .insert(name, (record.clone(), body));
        Ok(record)
    }

    fn delete_file(&self, _session: &Session, remote_path: &str) -> Result<bool> {
        self.enter("delete_file")?;
        let name = Self::name_of(remote_path).unwrap_or(remote_path);
        Ok(self.files.borrow_mut().remove(name).is_some())
    }

    fn get_metadata(&self, _session: &Session, remote_path: &str) -> Result<FileRecord> {
        self.enter("get_metadata")?;
        let name = Self::name_of(remote_path).unwrap_or(remote_path);
        self.record(name).ok_or_else(|| StoreError::NotFound {
            path: remote_path.to_owned(),
        })
    }

    fn exists(&self, _session: &Session, remote_path: &str) -> Result<bool> {
        self.enter("exists")?;
        let name = Self::name_of(remote_path).unwrap_or(remote_path);
        Ok(self.files.borrow().contains_key(name))
    }
}
