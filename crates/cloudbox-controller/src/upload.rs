//! Upload and folder-creation orchestrator.
//!
//! Validates a single staged file against the size ceiling, drives the
//! upload (or folder creation), and refreshes the entry list on success.
//! At most one upload or folder creation is in flight per orchestrator;
//! entry downloads and deletions are guarded per target instead.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{info, warn};

use cloudbox_client::{EntryRepository, FileUpload};
use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::traits::DownloadSink;
use cloudbox_core::types::EntryId;
use cloudbox_entity::entry::{Entry, FileEntry};

use crate::entries::EntryList;
use crate::pending::{ActionKind, ActionTarget, PendingAction};

/// Upload size ceiling: 100 MiB.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// How far the local progress approximation advances per tick while the
/// upload is in flight. It converges on 90 and jumps to 100 on success;
/// it is a UX affordance, not transport telemetry.
const PROGRESS_STEP: u8 = 10;
const PROGRESS_CEILING: u8 = 90;
const PROGRESS_TICK: std::time::Duration = std::time::Duration::from_millis(200);

/// A client-held, not-yet-submitted file selected for upload.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    /// Filename the upload will be created under.
    pub name: String,
    /// Raw content.
    pub content: Bytes,
}

#[derive(Debug, Default)]
struct UploadState {
    /// The single staged candidate; restaging replaces it.
    staged: Option<StagedUpload>,
    /// In-flight markers, at most one per target.
    pending: Vec<PendingAction>,
    /// Local progress approximation in `[0, 100]`.
    progress: u8,
}

impl UploadState {
    fn has_commit_in_flight(&self) -> bool {
        self.pending
            .iter()
            .any(|p| matches!(p.kind, ActionKind::Upload | ActionKind::Create))
    }

    fn has_action_on(&self, target: &ActionTarget) -> bool {
        self.pending.iter().any(|p| p.is_on(target))
    }

    fn finish(&mut self, action: &PendingAction) {
        self.pending.retain(|p| p != action);
    }
}

/// Drives uploads, folder creation, and per-entry download/delete actions.
#[derive(Clone)]
pub struct UploadOrchestrator {
    repo: Arc<dyn EntryRepository>,
    sink: Arc<dyn DownloadSink>,
    entries: EntryList,
    state: Arc<RwLock<UploadState>>,
}

impl UploadOrchestrator {
    /// Create an orchestrator that refreshes `entries` after successful
    /// mutations and delivers downloads to `sink`.
    pub fn new(
        repo: Arc<dyn EntryRepository>,
        sink: Arc<dyn DownloadSink>,
        entries: EntryList,
    ) -> Self {
        Self {
            repo,
            sink,
            entries,
            state: Arc::new(RwLock::new(UploadState::default())),
        }
    }

    /// Validate a file against the size ceiling and stage it as the
    /// pending upload candidate, replacing any prior candidate.
    pub async fn stage(&self, name: impl Into<String>, content: Bytes) -> AppResult<()> {
        if content.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::validation(
                "file exceeds the 100 MiB upload limit",
            ));
        }
        let mut state = self.state.write().await;
        state.staged = Some(StagedUpload {
            name: name.into(),
            content,
        });
        state.progress = 0;
        Ok(())
    }

    /// The currently staged candidate, if any.
    pub async fn staged(&self) -> Option<StagedUpload> {
        self.state.read().await.staged.clone()
    }

    /// Current value of the local progress approximation.
    pub async fn progress(&self) -> u8 {
        self.state.read().await.progress
    }

    /// Submit the staged candidate to `parent_id`.
    ///
    /// On success the candidate is cleared and the entry list refreshed.
    /// On failure the candidate is retained so the user can retry without
    /// re-selecting the file.
    pub async fn commit_upload(&self, parent_id: Option<EntryId>) -> AppResult<Entry> {
        let action = PendingAction::new(ActionKind::Upload, ActionTarget::Destination(parent_id));
        let staged = {
            let mut state = self.state.write().await;
            if state.has_commit_in_flight() {
                return Err(AppError::conflict(
                    "another upload or folder creation is already in flight",
                ));
            }
            let staged = state
                .staged
                .clone()
                .ok_or_else(|| AppError::validation("no file is staged for upload"))?;
            state.pending.push(action);
            state.progress = 0;
            staged
        };

        self.spawn_progress_ticker();

        let result = self
            .repo
            .upload_file(FileUpload {
                name: staged.name.clone(),
                content: staged.content,
                parent_id,
            })
            .await;

        let mut state = self.state.write().await;
        state.finish(&action);
        match result {
            Ok(entry) => {
                state.staged = None;
                state.progress = 100;
                drop(state);
                info!(name = %staged.name, "Upload committed");
                self.entries.refresh().await?;
                Ok(entry)
            }
            Err(e) => {
                // Candidate stays staged for retry.
                drop(state);
                warn!(name = %staged.name, error = %e, "Upload failed");
                Err(e)
            }
        }
    }

    /// Create a folder under `parent_id` and refresh the entry list.
    /// Server error messages pass through verbatim.
    pub async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<EntryId>,
    ) -> AppResult<Entry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("folder name cannot be empty"));
        }

        let action = PendingAction::new(ActionKind::Create, ActionTarget::Destination(parent_id));
        {
            let mut state = self.state.write().await;
            if state.has_commit_in_flight() {
                return Err(AppError::conflict(
                    "another upload or folder creation is already in flight",
                ));
            }
            state.pending.push(action);
        }

        let result = self.repo.create_folder(name, parent_id).await;
        self.state.write().await.finish(&action);

        match result {
            Ok(entry) => {
                info!(name, "Folder created");
                self.entries.refresh().await?;
                Ok(entry)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete an entry and refresh the list. A second call while one is
    /// pending for the same entry is a no-op.
    pub async fn delete_entry(&self, entry_id: EntryId) -> AppResult<()> {
        let action = PendingAction::new(ActionKind::Delete, ActionTarget::Entry(entry_id));
        {
            let mut state = self.state.write().await;
            if state.has_action_on(&action.target) {
                return Ok(());
            }
            state.pending.push(action);
        }

        let result = self.repo.delete_entry(entry_id).await;
        self.state.write().await.finish(&action);

        match result {
            Ok(()) => {
                info!(%entry_id, "Entry deleted");
                self.entries.refresh().await
            }
            Err(e) => Err(e),
        }
    }

    /// Download the current version of a file and deliver it to the sink
    /// under its display name. A second call while one is pending for the
    /// same entry is a no-op.
    pub async fn download_entry(&self, file: &FileEntry) -> AppResult<()> {
        let action = PendingAction::new(ActionKind::Download, ActionTarget::Entry(file.id));
        {
            let mut state = self.state.write().await;
            if state.has_action_on(&action.target) {
                return Ok(());
            }
            state.pending.push(action);
        }

        let result = self.repo.download_file(file.id).await;
        let delivered = match result {
            Ok(content) => self.sink.save(&file.name, content).await,
            Err(e) => Err(e),
        };
        self.state.write().await.finish(&action);
        delivered
    }

    /// Advance the progress approximation while the upload is in flight.
    fn spawn_progress_ticker(&self) {
        let state = self.state.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(PROGRESS_TICK).await;
                let mut state = state.write().await;
                if !state.has_commit_in_flight() {
                    break;
                }
                if state.progress < PROGRESS_CEILING {
                    state.progress += PROGRESS_STEP;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{folder_entry, MockRepository, RecordingSink};
    use cloudbox_core::error::ErrorKind;
    use std::sync::atomic::Ordering;

    fn orchestrator(repo: Arc<MockRepository>) -> (UploadOrchestrator, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let entries = EntryList::new(repo.clone());
        (
            UploadOrchestrator::new(repo, sink.clone(), entries),
            sink,
        )
    }

    #[tokio::test]
    async fn test_stage_rejects_one_byte_over_the_ceiling() {
        let (orchestrator, _sink) = orchestrator(Arc::new(MockRepository::new()));
        let oversized = Bytes::from(vec![0u8; MAX_UPLOAD_BYTES + 1]);
        let err = orchestrator
            .stage("big.bin", oversized)
            .await
            .expect_err("must reject");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(orchestrator.staged().await.is_none());
    }

    #[tokio::test]
    async fn test_stage_accepts_exactly_the_ceiling() {
        let (orchestrator, _sink) = orchestrator(Arc::new(MockRepository::new()));
        let exact = Bytes::from(vec![0u8; MAX_UPLOAD_BYTES]);
        orchestrator
            .stage("fits.bin", exact)
            .await
            .expect("exactly 100 MiB is allowed");
        assert_eq!(
            orchestrator.staged().await.map(|s| s.name),
            Some("fits.bin".to_string())
        );
    }

    #[tokio::test]
    async fn test_restaging_replaces_prior_candidate() {
        let (orchestrator, _sink) = orchestrator(Arc::new(MockRepository::new()));
        orchestrator
            .stage("first.txt", Bytes::from_static(b"a"))
            .await
            .expect("stage");
        orchestrator
            .stage("second.txt", Bytes::from_static(b"b"))
            .await
            .expect("restage");
        assert_eq!(
            orchestrator.staged().await.map(|s| s.name),
            Some("second.txt".to_string())
        );
    }

    #[tokio::test]
    async fn test_commit_without_staged_candidate_fails() {
        let (orchestrator, _sink) = orchestrator(Arc::new(MockRepository::new()));
        let err = orchestrator
            .commit_upload(None)
            .await
            .expect_err("nothing staged");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_successful_commit_clears_candidate_and_reloads() {
        let repo = Arc::new(MockRepository::new());
        let (orchestrator, _sink) = orchestrator(repo.clone());
        orchestrator
            .stage("report.pdf", Bytes::from_static(b"pdf bytes"))
            .await
            .expect("stage");

        let entry = orchestrator.commit_upload(None).await.expect("commit");
        assert_eq!(entry.name(), "report.pdf");
        assert!(orchestrator.staged().await.is_none());
        assert_eq!(orchestrator.progress().await, 100);
        // The refreshed list contains the new entry.
        assert_eq!(orchestrator.entries.entries().await, vec![entry]);
    }

    #[tokio::test]
    async fn test_failed_commit_retains_candidate_and_permits_retry() {
        let repo = Arc::new(MockRepository::new());
        let (orchestrator, _sink) = orchestrator(repo.clone());
        let fifty_mb = Bytes::from(vec![0u8; 50 * 1024 * 1024]);
        orchestrator
            .stage("big-but-legal.bin", fifty_mb)
            .await
            .expect("stage");

        repo.fail_next_upload().await;
        let err = orchestrator
            .commit_upload(None)
            .await
            .expect_err("upload fails");
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(orchestrator.staged().await.is_some());

        // Second commit is permitted and succeeds.
        orchestrator.commit_upload(None).await.expect("retry");
        assert_eq!(repo.upload_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_commit_rejected_while_first_is_in_flight() {
        let repo = Arc::new(MockRepository::new());
        let (orchestrator, _sink) = orchestrator(repo.clone());
        orchestrator
            .stage("slow.bin", Bytes::from_static(b"slow"))
            .await
            .expect("stage");

        let gate = repo.hold_upload().await;
        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.commit_upload(None).await })
        };
        gate.entered().await;

        let err = orchestrator
            .commit_upload(None)
            .await
            .expect_err("parallel commit");
        assert_eq!(err.kind, ErrorKind::Conflict);
        let err = orchestrator
            .create_folder("blocked", None)
            .await
            .expect_err("parallel create");
        assert_eq!(err.kind, ErrorKind::Conflict);

        gate.release();
        first.await.expect("join").expect("first commit succeeds");
        assert_eq!(repo.upload_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_folder_rejects_blank_names() {
        let (orchestrator, _sink) = orchestrator(Arc::new(MockRepository::new()));
        let err = orchestrator
            .create_folder("   ", None)
            .await
            .expect_err("blank name");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_folder_passes_server_error_verbatim() {
        let repo = Arc::new(MockRepository::new());
        let (orchestrator, _sink) = orchestrator(repo.clone());
        repo.fail_next_create_folder().await;
        let err = orchestrator
            .create_folder("reports", None)
            .await
            .expect_err("server rejects");
        assert_eq!(err.message, "folder 'reports' already exists");
    }

    #[tokio::test]
    async fn test_create_folder_trims_and_reloads() {
        let repo = Arc::new(MockRepository::new());
        let (orchestrator, _sink) = orchestrator(repo.clone());
        let entry = orchestrator
            .create_folder("  photos  ", None)
            .await
            .expect("create");
        assert_eq!(entry.name(), "photos");
        assert_eq!(orchestrator.entries.entries().await, vec![entry]);
    }

    #[tokio::test]
    async fn test_download_entry_delivers_under_display_name() {
        let repo = Arc::new(MockRepository::new());
        let (orchestrator, sink) = orchestrator(repo);
        let entry = crate::testing::file_entry("thesis.pdf", 1);
        let file = entry.as_file().expect("file");
        orchestrator.download_entry(file).await.expect("download");
        assert_eq!(sink.saved_names().await, vec!["thesis.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_entry_refreshes_list() {
        let repo = Arc::new(MockRepository::new());
        let (orchestrator, _sink) = orchestrator(repo.clone());
        let folder = folder_entry("doomed");
        repo.set_entries(None, vec![folder.clone()]).await;
        orchestrator.entries.reload(None).await.expect("reload");

        orchestrator.delete_entry(folder.id()).await.expect("delete");
        assert!(orchestrator.entries.entries().await.is_empty());
    }
}
