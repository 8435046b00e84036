use std::{
    fs::{self, File, Permissions},
    io::{self, Read},
    path::Path,
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use driftsync_model::FileRecord;
use driftsync_runtime::PARTIAL_SUFFIX;
use tempfile::{Builder, NamedTempFile};

use crate::scanner::scan_folder;

/// Local side of a sync run.
pub trait LocalFilesystem {
    fn is_dir(&self, path: &Path) -> bool;

    /// Shallow listing of the regular files inside `dir`.
    fn scan(&self, dir: &Path) -> io::Result<Vec<FileRecord>>;

    /// Create or overwrite `path` with everything `src` yields. Readers of
    /// `path` observe either the previous contents or the complete new file.
    fn write_atomic(&self, path: &Path, src: &mut dyn Read) -> io::Result<u64>;

    fn set_modified(&self, path: &Path, modified_at: DateTime<Utc>) -> io::Result<()>;

    /// Returns `false` when there was nothing to remove.
    fn remove_file(&self, path: &Path) -> io::Result<bool>;
}

/// [`LocalFilesystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFilesystem;

impl LocalFilesystem for StdFilesystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn scan(&self, dir: &Path) -> io::Result<Vec<FileRecord>> {
        scan_folder(dir)
    }

    fn write_atomic(&self, path: &Path, src: &mut dyn Read) -> io::Result<u64> {
        let mut tmp = partial_file(path)?;

        let written = io::copy(src, tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;

        tmp.persist(path).map_err(|e| e.error)?;

        Ok(written)
    }

    fn set_modified(&self, path: &Path, modified_at: DateTime<Utc>) -> io::Result<()> {
        // The owner may set times through a read-only handle, so read-only
        // files keep working.
        #[cfg(unix)]
        let file = File::open(path)?;
        #[cfg(not(unix))]
        let file = File::options().write(true).open(path)?;

        file.set_modified(SystemTime::from(modified_at))
    }

    fn remove_file(&self, path: &Path) -> io::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Create the hidden temp file that will replace `dest` once persisted.
///
/// It lives in the same directory as `dest` so the final rename stays on one
/// filesystem. An existing `dest` hands its permissions over; a new file gets
/// the mode a plain create would give it.
pub fn partial_file(dest: &Path) -> io::Result<NamedTempFile> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let file_name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download");
    let prefix = format!(".{file_name}.");

    let mut builder = Builder::new();
    builder.prefix(&prefix).suffix(PARTIAL_SUFFIX);

    match fs::metadata(dest) {
        Ok(meta) => {
            builder.permissions(meta.permissions());
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Some(permissions) = create_permissions() {
                builder.permissions(permissions);
            }
        }
        Err(e) => return Err(e),
    }

    builder.tempfile_in(parent)
}

/// Names of the temp files made by [`partial_file`]: hidden, with the partial
/// suffix.
pub fn is_partial_name(name: &str) -> bool {
    name.len() > 1 + PARTIAL_SUFFIX.len()
        && name.starts_with('.')
        && name.ends_with(PARTIAL_SUFFIX)
}

// tempfile defaults to 0600; a plain create asks for 0666 and lets the umask
// trim it.
#[cfg(unix)]
fn create_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn create_permissions() -> Option<Permissions> {
    None
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
