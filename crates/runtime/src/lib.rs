mod config;
pub mod history;
pub mod logging;

pub use config::{
    DEFAULT_SKEW_MS, PARTIAL_SUFFIX, PROGRAM_LOG_LEVEL, PROGRAM_NAME, SIDECAR_SUFFIX,
    default_store_dir, driftsync_dir, xdg_or_home,
};

pub use logging::init;
