use std::path::PathBuf;

pub const PROGRAM_NAME: &str = "driftsync";
pub const PROGRAM_LOG_LEVEL: &str = "DRIFTSYNC_LOG_LEVEL";

/// Default tolerance between two modification times before a file is
/// considered changed.
pub const DEFAULT_SKEW_MS: u64 = 1000;

/// Suffix of the JSON metadata file stored beside each remote file.
pub const SIDECAR_SUFFIX: &str = ".meta.json";

/// Suffix of in-flight download files. They are renamed into place once the
/// copy finished and are never reported by a scan.
pub const PARTIAL_SUFFIX: &str = ".driftsync-part";

pub fn xdg_or_home(xdg_var: &str, home_suffix: &str) -> PathBuf {
    if let Some(dir) = std::env::var_os(xdg_var) {
        PathBuf::from(dir)
    } else {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(home_suffix)
    }
}

pub fn driftsync_dir() -> PathBuf {
    xdg_or_home("XDG_DATA_HOME", ".local/share").join(PROGRAM_NAME)
}

/// Default directory backing the folder store
pub fn default_store_dir() -> PathBuf {
    driftsync_dir().join("store")
}

