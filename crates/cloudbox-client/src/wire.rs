//! Wire-format DTOs for the CloudBox API.
//!
//! The gateway represents entries as one flat record with an `is_folder`
//! flag. That shape never escapes this module: records are converted into
//! the tagged [`Entry`] union at the boundary.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::types::EntryId;
use cloudbox_entity::entry::{Entry, FileEntry, FolderEntry};
use cloudbox_entity::version::Version;

/// Standard response envelope of the API gateway.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    /// Whether the operation succeeded.
    #[serde(default)]
    pub success: bool,
    /// Payload, present on success.
    pub data: Option<T>,
    /// Server-supplied error message, present on failure.
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Extract the payload, turning an unsuccessful envelope into an error
    /// carrying the server message (or `fallback` when none was supplied).
    pub fn into_data(self, fallback: &str) -> AppResult<T> {
        if self.success {
            self.data
                .ok_or_else(|| AppError::internal(format!("{fallback}: empty response body")))
        } else {
            let message = self.error.unwrap_or_else(|| fallback.to_string());
            Err(AppError::internal(message))
        }
    }
}

/// Flat entry record as returned by the gateway.
#[derive(Debug, Deserialize)]
pub(crate) struct EntryRecord {
    pub id: EntryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub parent_id: Option<EntryId>,
    #[serde(default)]
    pub is_folder: bool,
    #[serde(default)]
    pub current_version: i32,
    #[serde(default)]
    pub version_count: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<EntryRecord> for Entry {
    fn from(record: EntryRecord) -> Self {
        if record.is_folder {
            Entry::Folder(FolderEntry {
                id: record.id,
                name: record.name,
                parent_id: record.parent_id,
                updated_at: record.updated_at,
            })
        } else {
            // Files are displayed under their original uploaded name; the
            // server-side storage name is an implementation detail.
            let name = if record.original_name.is_empty() {
                record.name
            } else {
                record.original_name
            };
            Entry::File(FileEntry {
                id: record.id,
                name,
                size: record.size,
                mime_type: none_if_empty(record.mime_type),
                version_count: record.version_count,
                current_version: record.current_version,
                parent_id: record.parent_id,
                updated_at: record.updated_at,
            })
        }
    }
}

/// Version record as returned by the gateway.
#[derive(Debug, Deserialize)]
pub(crate) struct VersionRecord {
    pub version: i32,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_current: bool,
}

impl From<VersionRecord> for Version {
    fn from(record: VersionRecord) -> Self {
        Version {
            version_number: record.version,
            size: record.size,
            mime_type: none_if_empty(record.mime_type),
            uploaded_at: record.uploaded_at,
            comment: record.comment.filter(|c| !c.is_empty()),
            is_current: record.is_current,
        }
    }
}

fn none_if_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
