//! Entry list view-model.
//!
//! Fetches and holds the entry set for the active folder. This component
//! performs no writes; mutation flows through the upload orchestrator or
//! the version controller, which call back into [`EntryList::refresh`].

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use cloudbox_client::EntryRepository;
use cloudbox_core::result::AppResult;
use cloudbox_core::types::EntryId;
use cloudbox_entity::entry::Entry;

/// Per-entry affordances, gated by entry kind and version count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    /// Descend into a folder.
    Open,
    /// Download the current version of a file.
    Download,
    /// Open the version history.
    ViewVersions,
    /// Delete the entry.
    Delete,
}

#[derive(Debug, Default)]
struct ListState {
    /// The folder whose contents are (being) displayed.
    folder_id: Option<EntryId>,
    /// Entries in server order. The client never re-sorts.
    entries: Vec<Entry>,
    /// Busy flag for the UI; governs presentation, not data validity.
    loading: bool,
    /// Monotonic tag; a completed reload applies only if its tag is still
    /// the latest, so a slow reload for a superseded folder is discarded.
    seq: u64,
}

/// Holds the renderable entry list for the currently active folder.
#[derive(Clone)]
pub struct EntryList {
    repo: Arc<dyn EntryRepository>,
    state: Arc<RwLock<ListState>>,
}

impl EntryList {
    /// Create an empty list over the repository.
    pub fn new(repo: Arc<dyn EntryRepository>) -> Self {
        Self {
            repo,
            state: Arc::new(RwLock::new(ListState::default())),
        }
    }

    /// Load the contents of `folder_id`, replacing the held list
    /// atomically on success.
    ///
    /// Every reload is tagged; if another reload (for any folder) starts
    /// before this one resolves, this one's result — success or failure —
    /// is discarded at apply time. On a surfaced failure the previous
    /// list is left untouched so the view stays interactable.
    pub async fn reload(&self, folder_id: Option<EntryId>) -> AppResult<()> {
        let seq = {
            let mut state = self.state.write().await;
            state.seq += 1;
            state.folder_id = folder_id;
            state.loading = true;
            state.seq
        };

        let result = self.repo.list_entries(folder_id).await;

        let mut state = self.state.write().await;
        if state.seq != seq {
            debug!(
                folder = ?folder_id,
                "Discarding superseded entry list response"
            );
            return Ok(());
        }
        state.loading = false;
        match result {
            Ok(entries) => {
                debug!(folder = ?folder_id, count = entries.len(), "Entry list replaced");
                state.entries = entries;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Reload the currently active folder.
    pub async fn refresh(&self) -> AppResult<()> {
        let folder_id = self.state.read().await.folder_id;
        self.reload(folder_id).await
    }

    /// The folder the held list belongs to (`None` = root).
    pub async fn current_folder_id(&self) -> Option<EntryId> {
        self.state.read().await.folder_id
    }

    /// Snapshot of the held entries, server order preserved.
    pub async fn entries(&self) -> Vec<Entry> {
        self.state.read().await.entries.clone()
    }

    /// Whether a reload is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Pure derivation of the actions an entry affords.
    ///
    /// Folders only open; files always download and delete, and expose
    /// version history only once more than one version is retained.
    pub fn available_actions(entry: &Entry) -> Vec<EntryAction> {
        match entry {
            Entry::Folder(_) => vec![EntryAction::Open],
            Entry::File(file) => {
                let mut actions = vec![EntryAction::Download];
                if file.version_count > 1 {
                    actions.push(EntryAction::ViewVersions);
                }
                actions.push(EntryAction::Delete);
                actions
            }
        }
    }
}
