mod action;
mod record;
mod report;

pub use action::{ActionKind, SyncAction};
pub use record::FileRecord;
pub use report::{FailedFile, SyncReport};
