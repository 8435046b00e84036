use chrono::TimeDelta;
use driftsync_model::FileRecord;

use crate::reconcile::by_name;

/// Drift report for one local folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    /// The local folder does not exist.
    Missing,
    /// Number of shared files whose timestamps differ by more than the skew.
    Drift(usize),
}

impl FolderStatus {
    /// Numeric form used by scripts: `-1` for a missing folder, otherwise the
    /// drift count.
    pub const MISSING_CODE: i64 = -1;

    pub fn code(&self) -> i64 {
        match self {
            FolderStatus::Missing => Self::MISSING_CODE,
            FolderStatus::Drift(n) => *n as i64,
        }
    }

    pub fn is_in_sync(&self) -> bool {
        matches!(self, FolderStatus::Drift(0))
    }
}

/// Count files present on both sides whose modification times are more than
/// `skew` apart, in either direction. Files that exist on only one side are
/// not drift and never count.
pub fn status(local: &[FileRecord], remote: &[FileRecord], skew: TimeDelta) -> usize {
    let local_by_name = by_name(local);
    let remote_by_name = by_name(remote);

    local_by_name
        .iter()
        .filter_map(|(name, lf)| remote_by_name.get(name).map(|rf| (lf, rf)))
        .filter(|(lf, rf)| (lf.modified_at - rf.modified_at).abs() > skew)
        .count()
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
