use std::{
    fs::{self, read_dir},
    io::Result,
    path::Path,
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use driftsync_model::FileRecord;
use log::{debug, warn};

use crate::local::is_partial_name;

/// Enumerate the regular files directly inside `dir`.
///
/// The scan is shallow: subdirectories are skipped, symlinks are followed to
/// their targets, and in-flight download files are never reported. Entries
/// that cannot be inspected are logged and skipped rather than failing the
/// whole scan. Records come back sorted by name.
pub fn scan_folder(dir: &Path) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();

    for entry_res in read_dir(dir)? {
        let entry = match entry_res {
            Ok(e) => e,
            Err(e) => {
                warn!("[scan] error reading entry in {:?}: {e}", dir);
                continue;
            }
        };

        match inspect_fs_entry(&entry) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => warn!("[scan] inspect_entry error for {:?}: {e}", entry.path()),
        }
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("[scan] {:?}: {} files", dir, records.len());

    Ok(records)
}

fn inspect_fs_entry(entry: &fs::DirEntry) -> Result<Option<FileRecord>> {
    // Follow symlinks so a linked file is synced as the file it points to.
    let metadata = fs::metadata(entry.path())?;
    if !metadata.is_file() {
        return Ok(None);
    }

    let name_os = entry.file_name();
    let name = match name_os.to_str() {
        Some(s) => s.to_owned(),
        None => {
            warn!("[scan] skipping non UTF-8 file name {:?}", name_os);
            return Ok(None);
        }
    };

    if is_partial_name(&name) {
        debug!("[scan] skipping in-flight download {name}");
        return Ok(None);
    }

    let modified_at = to_utc(metadata.modified().ok());
    // Creation time is missing on some filesystems; fall back to mtime
    // rather than reporting the epoch.
    let created_at = metadata
        .created()
        .ok()
        .map(|t| to_utc(Some(t)))
        .unwrap_or(modified_at);

    Ok(Some(FileRecord::local(
        name,
        metadata.len(),
        created_at,
        modified_at,
    )))
}

/// Convert a filesystem timestamp to UTC. Missing times map to the epoch.
pub fn to_utc(t: Option<SystemTime>) -> DateTime<Utc> {
    t.map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
