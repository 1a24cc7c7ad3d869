//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable snapshot of a file's content.
///
/// `version_number` is 1-based and monotonically increasing within a file,
/// but the highest number is not necessarily the current version: a restore
/// flips the current flag server-side without allocating a new number. The
/// client always re-fetches the list to learn the authoritative mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Sequential version number, unique within a file.
    pub version_number: i32,
    /// Size in bytes.
    pub size: i64,
    /// MIME type at the time of upload.
    pub mime_type: Option<String>,
    /// When this version was uploaded.
    pub uploaded_at: DateTime<Utc>,
    /// Optional comment describing the change.
    pub comment: Option<String>,
    /// Whether the file currently resolves to this version. Exactly one
    /// version per file carries this flag at any time.
    pub is_current: bool,
}
