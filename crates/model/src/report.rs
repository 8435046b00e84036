use serde::{Deserialize, Serialize};

/// A file whose action failed under the best-effort policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub name: String,
    pub error: String,
}

/// Aggregate outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub uploaded: usize,
    pub downloaded: usize,
    /// Per-file failures (always empty when failing fast)
    pub failed: Vec<FailedFile>,
    /// Run stopped early on a cancellation request
    pub cancelled: bool,
    /// Human-readable summary, also sent as the last progress message
    pub summary: String,
}

impl SyncReport {
    /// Compose the final summary line from the counters.
    pub fn summarize(&mut self) {
        let head = if self.cancelled {
            "Synchronization cancelled."
        } else {
            "Synchronization complete."
        };

        let mut summary = format!(
            "{head} Uploaded: {}, Downloaded: {}",
            self.uploaded, self.downloaded
        );
        if !self.failed.is_empty() {
            summary.push_str(&format!(", Failed: {}", self.failed.len()));
        }
        self.summary = summary;
    }

    /// No failures and not cancelled.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}
