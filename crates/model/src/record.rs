use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one file on either side of a sync.
///
/// Local records leave the remote-only fields (`id`, attribution,
/// `remote_path`) empty. Records are produced fresh by every listing and are
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Identifier assigned by the remote store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// File name, the join key between listings. Compared verbatim.
    pub name: String,
    /// Extension including the leading dot, case preserved
    #[serde(default)]
    pub extension: Option<String>,
    /// File size in bytes
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub edited_by: Option<String>,
    /// Opaque locator understood by the remote store that produced the record
    #[serde(default)]
    pub remote_path: Option<String>,
}

impl FileRecord {
    /// Build a local-side record.
    pub fn local(
        name: impl Into<String>,
        size: u64,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        Self {
            id: None,
            name,
            extension,
            size,
            created_at,
            modified_at,
            uploaded_by: None,
            edited_by: None,
            remote_path: None,
        }
    }

    /// Find a record by exact name.
    pub fn find<'a>(records: &'a [FileRecord], name: &str) -> Option<&'a FileRecord> {
        records.iter().find(|r| r.name == name)
    }
}

/// Everything from the last dot on, so `.bashrc` is its own extension. A
/// trailing dot or no dot at all yields `None`.
pub(crate) fn extension_of(name: &str) -> Option<String> {
    name.rfind('.')
        .filter(|&dot| dot + 1 < name.len())
        .map(|dot| name[dot..].to_owned())
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
