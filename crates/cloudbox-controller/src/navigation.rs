//! Folder navigation controller.
//!
//! Owns the breadcrumb path, a persistent cursor for the lifetime of the
//! view. The path is append-only on descent and truncated on ascent; the
//! head is always the root.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::types::EntryId;
use cloudbox_entity::entry::Entry;

use crate::entries::EntryList;

/// Display label of the root crumb.
pub const ROOT_LABEL: &str = "My Files";

/// One breadcrumb: a visited folder and its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    /// The folder this crumb points at; `None` is the root.
    pub folder_id: Option<EntryId>,
    /// Display name.
    pub name: String,
}

impl Crumb {
    fn root() -> Self {
        Self {
            folder_id: None,
            name: ROOT_LABEL.to_string(),
        }
    }
}

/// Owns the current folder cursor and drives entry-list reloads on
/// navigation.
#[derive(Clone)]
pub struct FolderNavigator {
    entries: EntryList,
    path: Arc<RwLock<Vec<Crumb>>>,
}

impl FolderNavigator {
    /// Create a navigator positioned at the root.
    pub fn new(entries: EntryList) -> Self {
        Self {
            entries,
            path: Arc::new(RwLock::new(vec![Crumb::root()])),
        }
    }

    /// Descend into a folder entry, appending it to the path and loading
    /// its contents.
    ///
    /// Opening a file entry is invalid navigation and is rejected before
    /// any state changes.
    pub async fn open(&self, entry: &Entry) -> AppResult<()> {
        let Entry::Folder(folder) = entry else {
            return Err(AppError::validation(format!(
                "'{}' is a file and cannot be opened as a folder",
                entry.name()
            )));
        };

        {
            let mut path = self.path.write().await;
            path.push(Crumb {
                folder_id: Some(folder.id),
                name: folder.name.clone(),
            });
            debug!(folder = %folder.name, depth = path.len() - 1, "Opened folder");
        }
        self.entries.reload(Some(folder.id)).await
    }

    /// Jump to a crumb by index, discarding everything after it and
    /// reloading that folder. `jump_to(0)` always returns to the root.
    pub async fn jump_to(&self, index: usize) -> AppResult<()> {
        let target = {
            let mut path = self.path.write().await;
            if index >= path.len() {
                return Err(AppError::validation(format!(
                    "breadcrumb index {index} is out of range"
                )));
            }
            path.truncate(index + 1);
            path[index].folder_id
        };
        self.entries.reload(target).await
    }

    /// Snapshot of the breadcrumb path, head = root.
    pub async fn path(&self) -> Vec<Crumb> {
        self.path.read().await.clone()
    }

    /// The folder the cursor points at (`None` = root).
    pub async fn current_folder_id(&self) -> Option<EntryId> {
        self.path
            .read()
            .await
            .last()
            .and_then(|crumb| crumb.folder_id)
    }

    /// The entry list this navigator drives.
    pub fn entry_list(&self) -> &EntryList {
        &self.entries
    }
}
