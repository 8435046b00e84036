use driftsync_model::{ActionKind, SyncReport};

/// A step of a sync run, as reported to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Started,
    /// An upload or download completed.
    Applied { kind: ActionKind, name: String },
    /// An action failed; under fail-fast this is the last event.
    Failed { name: String, error: String },
    Finished(SyncReport),
}

impl Progress {
    /// Human-readable one-line description.
    pub fn message(&self) -> String {
        match self {
            Progress::Started => "Starting synchronization...".to_owned(),
            Progress::Applied { kind, name } => match kind {
                ActionKind::UploadNew => format!("Uploaded new file: {name}"),
                ActionKind::UploadUpdate => format!("Updated file: {name}"),
                ActionKind::DownloadNew => format!("Downloaded new file: {name}"),
                ActionKind::DownloadUpdate => format!("Downloaded file: {name}"),
                ActionKind::NoOp => format!("Unchanged: {name}"),
            },
            Progress::Failed { name, error } => format!("Failed to sync {name}: {error}"),
            Progress::Finished(report) => report.summary.clone(),
        }
    }
}

/// Receives progress synchronously on the thread running the sync. Slow
/// sinks stall the run.
pub trait ProgressSink {
    fn on_progress(&mut self, event: &Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(&Progress),
{
    fn on_progress(&mut self, event: &Progress) {
        self(event)
    }
}

/// Fan-out to any number of sinks, in subscription order.
#[derive(Default)]
pub struct Listeners<'a> {
    sinks: Vec<Box<dyn ProgressSink + 'a>>,
}

impl<'a> Listeners<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: impl ProgressSink + 'a) {
        self.sinks.push(Box::new(sink));
    }

    pub fn emit(&mut self, event: &Progress) {
        for sink in &mut self.sinks {
            sink.on_progress(event);
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
