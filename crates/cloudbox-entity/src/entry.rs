//! File and folder entry entities.
//!
//! Entries form a server-owned tree. The server guarantees acyclicity and
//! the single-parent invariant; the client renders what it receives and
//! never re-validates the tree shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudbox_core::types::EntryId;

/// A node in the folder hierarchy.
///
/// Folder-only and file-only fields are never simultaneously present: the
/// two variants carry exactly the fields that are meaningful for them
/// (a folder has no size, a file has no children).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    /// A folder that may contain further entries.
    Folder(FolderEntry),
    /// A file with content and a version history.
    File(FileEntry),
}

/// A folder node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Opaque unique identifier, stable across renames.
    pub id: EntryId,
    /// Folder name.
    pub name: String,
    /// Containing folder; `None` means the root.
    pub parent_id: Option<EntryId>,
    /// When the folder was last modified.
    pub updated_at: DateTime<Utc>,
}

/// A file node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Opaque unique identifier, stable across renames.
    pub id: EntryId,
    /// Original uploaded filename, used for display and downloads.
    pub name: String,
    /// Size of the current version in bytes.
    pub size: i64,
    /// MIME type, when the server knows one.
    pub mime_type: Option<String>,
    /// Number of retained versions.
    pub version_count: i32,
    /// Version number the file resolves to on download-by-default.
    pub current_version: i32,
    /// Containing folder; `None` means the root.
    pub parent_id: Option<EntryId>,
    /// When the file was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// The entry's identifier.
    pub fn id(&self) -> EntryId {
        match self {
            Self::Folder(f) => f.id,
            Self::File(f) => f.id,
        }
    }

    /// The entry's display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(f) => &f.name,
            Self::File(f) => &f.name,
        }
    }

    /// The containing folder, `None` for entries at the root.
    pub fn parent_id(&self) -> Option<EntryId> {
        match self {
            Self::Folder(f) => f.parent_id,
            Self::File(f) => f.parent_id,
        }
    }

    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    /// The folder variant, if this entry is one.
    pub fn as_folder(&self) -> Option<&FolderEntry> {
        match self {
            Self::Folder(f) => Some(f),
            Self::File(_) => None,
        }
    }

    /// The file variant, if this entry is one.
    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Self::File(f) => Some(f),
            Self::Folder(_) => None,
        }
    }
}

impl FileEntry {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> FileEntry {
        FileEntry {
            id: EntryId::new(),
            name: name.to_string(),
            size: 42,
            mime_type: None,
            version_count: 1,
            current_version: 1,
            parent_id: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_variant_accessors() {
        let entry = Entry::File(file("report.pdf"));
        assert!(!entry.is_folder());
        assert!(entry.as_folder().is_none());
        assert_eq!(entry.as_file().map(|f| f.name.as_str()), Some("report.pdf"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(file("Photo.JPG").extension().as_deref(), Some("jpg"));
        assert_eq!(file("Makefile").extension(), None);
    }
}
