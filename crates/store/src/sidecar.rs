use std::{
    fs, io,
    path::{Path, PathBuf},
};

use driftsync_model::FileRecord;
use driftsync_runtime::SIDECAR_SUFFIX;
use log::debug;

use crate::Result;

pub(crate) fn sidecar_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(SIDECAR_SUFFIX);
    PathBuf::from(os)
}

/// Read the sidecar beside `path`. Missing, unreadable and malformed
/// sidecars all yield `None`.
pub(crate) fn load(path: &Path) -> Option<FileRecord> {
    let meta_path = sidecar_path(path);
    let json = match fs::read_to_string(&meta_path) {
        Ok(json) => json,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                debug!("[sidecar] cannot read {:?}: {e}", meta_path);
            }
            return None;
        }
    };

    match serde_json::from_str(&json) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("[sidecar] ignoring malformed {:?}: {e}", meta_path);
            None
        }
    }
}

pub(crate) fn save(path: &Path, record: &FileRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    fs::write(sidecar_path(path), json)?;
    Ok(())
}

pub(crate) fn remove(path: &Path) -> io::Result<()> {
    match fs::remove_file(sidecar_path(path)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
