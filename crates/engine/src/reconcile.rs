use chrono::{DateTime, TimeDelta, Utc};
use driftsync_model::{FileRecord, SyncAction};
use driftsync_runtime::DEFAULT_SKEW_MS;
use hashbrown::{HashMap, HashSet};
use log::{debug, trace};

pub fn default_skew() -> TimeDelta {
    TimeDelta::milliseconds(DEFAULT_SKEW_MS as i64)
}

/// Index a listing by name. Later duplicates replace earlier ones.
pub(crate) fn by_name(records: &[FileRecord]) -> HashMap<&str, &FileRecord> {
    records.iter().map(|r| (r.name.as_str(), r)).collect()
}

/// `a` is later than `b` by strictly more than `skew`.
pub(crate) fn newer_than(a: DateTime<Utc>, b: DateTime<Utc>, skew: TimeDelta) -> bool {
    // Past the representable range nothing can be newer.
    b.checked_add_signed(skew).is_some_and(|limit| a > limit)
}

/// Decide what to do with every file name seen on either side.
///
/// Local names are visited first in local listing order, then names only the
/// remote side knows, in remote listing order. Each name yields exactly one
/// action. Timestamps within `skew` of each other count as equal, whichever
/// side is newer.
pub fn reconcile(local: &[FileRecord], remote: &[FileRecord], skew: TimeDelta) -> Vec<SyncAction> {
    let local_by_name = by_name(local);
    let remote_by_name = by_name(remote);

    let mut actions = Vec::with_capacity(local_by_name.len() + remote_by_name.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(local_by_name.len());

    for record in local {
        let name = record.name.as_str();
        if !seen.insert(name) {
            continue;
        }
        let lf = local_by_name[name];

        let action = match remote_by_name.get(name) {
            None => SyncAction::UploadNew(lf.clone()),
            Some(rf) if newer_than(lf.modified_at, rf.modified_at, skew) => {
                SyncAction::UploadUpdate(lf.clone())
            }
            Some(rf) if newer_than(rf.modified_at, lf.modified_at, skew) => {
                SyncAction::DownloadUpdate((*rf).clone())
            }
            Some(_) => SyncAction::NoOp(lf.name.clone()),
        };
        trace!("[reconcile] {} -> {}", name, action.kind());
        actions.push(action);
    }

    for record in remote {
        let name = record.name.as_str();
        if local_by_name.contains_key(name) || !seen.insert(name) {
            continue;
        }
        actions.push(SyncAction::DownloadNew(remote_by_name[name].clone()));
    }

    debug!(
        "[reconcile] {} local, {} remote -> {} actions",
        local.len(),
        remote.len(),
        actions.len()
    );
    actions
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
