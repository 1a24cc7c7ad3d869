//! Abstract contract of the remote file/folder/version store.

use async_trait::async_trait;
use bytes::Bytes;

use cloudbox_core::result::AppResult;
use cloudbox_core::types::EntryId;
use cloudbox_entity::entry::Entry;
use cloudbox_entity::version::Version;

/// A file selected for upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Filename sent to the server.
    pub name: String,
    /// Raw file content.
    pub content: Bytes,
    /// Target folder; `None` uploads to the root.
    pub parent_id: Option<EntryId>,
}

/// Typed request/response contract against the remote entry store.
///
/// The state core consumes only this trait; it carries no logic of its
/// own. Ordering of returned sequences is server-defined and preserved
/// by implementations.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// List the entries contained in `folder_id` (`None` = root).
    async fn list_entries(&self, folder_id: Option<EntryId>) -> AppResult<Vec<Entry>>;

    /// Upload a file, creating a new entry (or a new version of an
    /// existing entry, server-decided).
    async fn upload_file(&self, upload: FileUpload) -> AppResult<Entry>;

    /// Delete a file or folder entry.
    async fn delete_entry(&self, entry_id: EntryId) -> AppResult<()>;

    /// Create a folder under `parent_id` (`None` = root).
    async fn create_folder(&self, name: &str, parent_id: Option<EntryId>) -> AppResult<Entry>;

    /// Download the current version of a file.
    async fn download_file(&self, file_id: EntryId) -> AppResult<Bytes>;

    /// List the version history of a file.
    async fn list_versions(&self, file_id: EntryId) -> AppResult<Vec<Version>>;

    /// Download the content of one specific version.
    async fn download_version(&self, file_id: EntryId, version_number: i32) -> AppResult<Bytes>;

    /// Make `version_number` the current version. The server flips the
    /// current flag; no new version number is allocated.
    async fn restore_version(&self, file_id: EntryId, version_number: i32) -> AppResult<()>;

    /// Delete one non-current version.
    async fn delete_version(&self, file_id: EntryId, version_number: i32) -> AppResult<()>;
}
