mod cancel;
mod engine;
mod error;
mod executor;
mod progress;
mod reconcile;
mod status;

#[cfg(test)]
mod test_support;

pub use cancel::CancellationToken;
pub use engine::{SyncEngine, SyncOptions};
pub use error::{ActionError, SyncError};
pub use executor::{Executor, FailurePolicy};
pub use progress::{Listeners, Progress, ProgressSink};
pub use reconcile::{default_skew, reconcile};
pub use status::{FolderStatus, status};
