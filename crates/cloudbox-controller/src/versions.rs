//! Version lifecycle controller.
//!
//! Owns the version list for one file and coordinates download, restore,
//! and delete actions. Restore and delete are two-step: a request opens a
//! confirmation gate, a confirm executes it. At most one action per
//! version is in flight at any time, and at most one gate is open.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use cloudbox_client::EntryRepository;
use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::traits::DownloadSink;
use cloudbox_core::types::EntryId;
use cloudbox_entity::version::Version;

use crate::entries::EntryList;
use crate::pending::{ActionKind, ActionTarget, PendingAction};

/// The file whose version history is being managed.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetFile {
    /// File identifier.
    pub id: EntryId,
    /// Display name, used to derive download filenames.
    pub name: String,
}

/// Which mutation a confirmation gate is protecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// Make the gated version current.
    Restore,
    /// Delete the gated version.
    Delete,
}

/// An open confirmation gate. Opening a new gate replaces it; last
/// request wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationGate {
    /// The protected mutation.
    pub kind: GateKind,
    /// The gated version.
    pub version_number: i32,
}

#[derive(Debug, Default)]
struct VersionState {
    file: Option<TargetFile>,
    /// Versions in server order; the client renders whatever order arrives.
    versions: Vec<Version>,
    loading: bool,
    /// Set when the last load failed; the view stays open for retry.
    failed: bool,
    pending: Option<PendingAction>,
    gate: Option<ConfirmationGate>,
    /// Stale-load discard tag.
    seq: u64,
}

/// Coordinates the version history view for one file at a time.
#[derive(Clone)]
pub struct VersionController {
    repo: Arc<dyn EntryRepository>,
    sink: Arc<dyn DownloadSink>,
    entries: EntryList,
    state: Arc<RwLock<VersionState>>,
}

impl VersionController {
    /// Create a controller that delivers downloads to `sink` and refreshes
    /// `entries` after a confirmed restore.
    pub fn new(
        repo: Arc<dyn EntryRepository>,
        sink: Arc<dyn DownloadSink>,
        entries: EntryList,
    ) -> Self {
        Self {
            repo,
            sink,
            entries,
            state: Arc::new(RwLock::new(VersionState::default())),
        }
    }

    /// Fetch the version history of `file`, replacing any prior state.
    ///
    /// A failed load sets the error flag and clears the busy indicator but
    /// keeps the target so the user can retry. Responses for a superseded
    /// target are discarded at apply time.
    pub async fn load(&self, file: TargetFile) -> AppResult<()> {
        let seq = {
            let mut state = self.state.write().await;
            state.seq += 1;
            state.file = Some(file.clone());
            state.versions.clear();
            state.loading = true;
            state.failed = false;
            state.gate = None;
            state.seq
        };

        let result = self.repo.list_versions(file.id).await;

        let mut state = self.state.write().await;
        if state.seq != seq {
            debug!(file = %file.name, "Discarding superseded version list response");
            return Ok(());
        }
        state.loading = false;
        match result {
            Ok(versions) => {
                state.versions = versions;
                Ok(())
            }
            Err(e) => {
                state.failed = true;
                warn!(file = %file.name, error = %e, "Version list load failed");
                Err(e)
            }
        }
    }

    /// Reload the version history of the current target file.
    pub async fn reload(&self) -> AppResult<()> {
        let file = self
            .state
            .read()
            .await
            .file
            .clone()
            .ok_or_else(|| AppError::session("no file selected for version history"))?;
        self.load(file).await
    }

    /// Download one version and deliver it as `"{name}_v{number}"`.
    ///
    /// Ignored (returns `Ok`) when an action is already pending for that
    /// version. The pending marker is always cleared afterward, success or
    /// failure.
    pub async fn download(&self, version_number: i32) -> AppResult<()> {
        let (file, action) = {
            let mut state = self.state.write().await;
            let file = state
                .file
                .clone()
                .ok_or_else(|| AppError::session("no file selected for version history"))?;
            let target = ActionTarget::Version {
                file_id: file.id,
                number: version_number,
            };
            if state.pending.as_ref().is_some_and(|p| p.is_on(&target)) {
                debug!(version_number, "Ignoring download; action already pending");
                return Ok(());
            }
            let action = PendingAction::new(ActionKind::Download, target);
            state.pending = Some(action);
            (file, action)
        };

        let result = self.repo.download_version(file.id, version_number).await;
        let delivered = match result {
            Ok(content) => {
                let name = format!("{}_v{}", file.name, version_number);
                self.sink.save(&name, content).await
            }
            Err(e) => Err(e),
        };

        let mut state = self.state.write().await;
        if state.pending == Some(action) {
            state.pending = None;
        }
        delivered
    }

    /// Open the restore confirmation gate for a non-current version.
    pub async fn request_restore(&self, version_number: i32) -> AppResult<()> {
        self.request(GateKind::Restore, version_number).await
    }

    /// Open the delete confirmation gate for a non-current version.
    pub async fn request_delete(&self, version_number: i32) -> AppResult<()> {
        self.request(GateKind::Delete, version_number).await
    }

    async fn request(&self, kind: GateKind, version_number: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        let version = state
            .versions
            .iter()
            .find(|v| v.version_number == version_number)
            .ok_or_else(|| AppError::not_found(format!("version {version_number} not found")))?;
        if version.is_current {
            return Err(AppError::validation(match kind {
                GateKind::Restore => "the current version is already current",
                GateKind::Delete => "the current version cannot be deleted",
            }));
        }
        // Last request wins; the view shows a single confirmation dialog.
        state.gate = Some(ConfirmationGate {
            kind,
            version_number,
        });
        Ok(())
    }

    /// Close the confirmation gate without mutating anything.
    pub async fn cancel(&self) {
        self.state.write().await.gate = None;
    }

    /// Execute the gated mutation, then reload the version list so the
    /// current-flag mapping is authoritative. A confirmed restore also
    /// refreshes the entry list (version count and size may have changed
    /// on the parent file row).
    pub async fn confirm(&self) -> AppResult<()> {
        let (gate, file, action) = {
            let mut state = self.state.write().await;
            let gate = state
                .gate
                .take()
                .ok_or_else(|| AppError::validation("no confirmation is pending"))?;
            let file = state
                .file
                .clone()
                .ok_or_else(|| AppError::session("no file selected for version history"))?;
            let target = ActionTarget::Version {
                file_id: file.id,
                number: gate.version_number,
            };
            if state.pending.as_ref().is_some_and(|p| p.is_on(&target)) {
                return Ok(());
            }
            let kind = match gate.kind {
                GateKind::Restore => ActionKind::Restore,
                GateKind::Delete => ActionKind::Delete,
            };
            let action = PendingAction::new(kind, target);
            state.pending = Some(action);
            (gate, file, action)
        };

        let result = match gate.kind {
            GateKind::Restore => self.repo.restore_version(file.id, gate.version_number).await,
            GateKind::Delete => self.repo.delete_version(file.id, gate.version_number).await,
        };

        {
            let mut state = self.state.write().await;
            if state.pending == Some(action) {
                state.pending = None;
            }
        }

        match result {
            Ok(()) => {
                info!(
                    file = %file.name,
                    version = gate.version_number,
                    kind = ?gate.kind,
                    "Version mutation confirmed"
                );
                self.reload().await?;
                if gate.kind == GateKind::Restore {
                    self.entries.refresh().await?;
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// The versions as last loaded, server order preserved.
    pub async fn versions(&self) -> Vec<Version> {
        self.state.read().await.versions.clone()
    }

    /// The open confirmation gate, if any.
    pub async fn gate(&self) -> Option<ConfirmationGate> {
        self.state.read().await.gate
    }

    /// Whether a load is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Whether the last load failed.
    pub async fn has_failed(&self) -> bool {
        self.state.read().await.failed
    }

    /// The file whose history is shown, if one is selected.
    pub async fn target(&self) -> Option<TargetFile> {
        self.state.read().await.file.clone()
    }
}
