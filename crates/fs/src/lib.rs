mod local;
mod scanner;

pub use local::{LocalFilesystem, StdFilesystem, is_partial_name, partial_file};
pub use scanner::{scan_folder, to_utc};
