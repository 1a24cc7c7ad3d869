//! Shared test support: a programmable in-memory repository, a recording
//! download sink, and entity fixtures.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};

use cloudbox_client::{EntryRepository, FileUpload};
use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::traits::DownloadSink;
use cloudbox_core::types::EntryId;
use cloudbox_entity::entry::{Entry, FileEntry, FolderEntry};
use cloudbox_entity::version::Version;

/// A two-phase gate: the test waits for the mock to enter the held call,
/// then releases it at a chosen moment to exercise completion ordering.
pub struct Gate {
    entered_flag: AtomicBool,
    entered_notify: Notify,
    released: AtomicBool,
    release_notify: Notify,
}

impl Gate {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            entered_flag: AtomicBool::new(false),
            entered_notify: Notify::new(),
            released: AtomicBool::new(false),
            release_notify: Notify::new(),
        })
    }

    /// Wait until the held repository call has started.
    pub async fn entered(&self) {
        loop {
            let notified = self.entered_notify.notified();
            if self.entered_flag.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }

    /// Let the held repository call complete.
    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        self.release_notify.notify_waiters();
    }

    async fn pass(&self) {
        self.entered_flag.store(true, Ordering::SeqCst);
        self.entered_notify.notify_waiters();
        loop {
            let notified = self.release_notify.notified();
            if self.released.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

#[derive(Default)]
struct MockState {
    entries: HashMap<Option<EntryId>, Vec<Entry>>,
    versions: HashMap<EntryId, Vec<Version>>,
    fail_next: HashSet<&'static str>,
    held_lists: HashMap<Option<EntryId>, Arc<Gate>>,
    held_downloads: HashMap<i32, Arc<Gate>>,
    held_upload: Option<Arc<Gate>>,
}

/// Programmable [`EntryRepository`] for controller tests.
#[derive(Default)]
pub struct MockRepository {
    state: Mutex<MockState>,
    /// Transport-level call counters.
    pub upload_calls: AtomicUsize,
    pub download_version_calls: AtomicUsize,
    pub delete_version_calls: AtomicUsize,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_entries(&self, folder: Option<EntryId>, entries: Vec<Entry>) {
        self.state.lock().await.entries.insert(folder, entries);
    }

    pub async fn set_versions(&self, file_id: EntryId, versions: Vec<Version>) {
        self.state.lock().await.versions.insert(file_id, versions);
    }

    pub async fn fail_next_list(&self) {
        self.state.lock().await.fail_next.insert("list");
    }

    pub async fn fail_next_upload(&self) {
        self.state.lock().await.fail_next.insert("upload");
    }

    pub async fn fail_next_create_folder(&self) {
        self.state.lock().await.fail_next.insert("create_folder");
    }

    pub async fn fail_next_list_versions(&self) {
        self.state.lock().await.fail_next.insert("list_versions");
    }

    pub async fn fail_next_delete_version(&self) {
        self.state.lock().await.fail_next.insert("delete_version");
    }

    /// Hold the next `list_entries(folder)` call until released.
    pub async fn hold_list(&self, folder: Option<EntryId>) -> Arc<Gate> {
        let gate = Gate::new();
        self.state.lock().await.held_lists.insert(folder, gate.clone());
        gate
    }

    /// Hold the next `upload_file` call until released.
    pub async fn hold_upload(&self) -> Arc<Gate> {
        let gate = Gate::new();
        self.state.lock().await.held_upload = Some(gate.clone());
        gate
    }

    /// Hold the next `download_version(_, number)` call until released.
    pub async fn hold_download(&self, number: i32) -> Arc<Gate> {
        let gate = Gate::new();
        self.state
            .lock()
            .await
            .held_downloads
            .insert(number, gate.clone());
        gate
    }

    async fn take_failure(&self, op: &'static str) -> bool {
        self.state.lock().await.fail_next.remove(op)
    }
}

fn network(op: &str) -> AppError {
    AppError::network(format!("{op}: connection reset"))
}

#[async_trait]
impl EntryRepository for MockRepository {
    async fn list_entries(&self, folder_id: Option<EntryId>) -> AppResult<Vec<Entry>> {
        let gate = self.state.lock().await.held_lists.remove(&folder_id);
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.take_failure("list").await {
            return Err(network("list entries"));
        }
        Ok(self
            .state
            .lock()
            .await
            .entries
            .get(&folder_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upload_file(&self, upload: FileUpload) -> AppResult<Entry> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.state.lock().await.held_upload.take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.take_failure("upload").await {
            return Err(network("upload file"));
        }
        let entry = Entry::File(FileEntry {
            id: EntryId::new(),
            name: upload.name,
            size: upload.content.len() as i64,
            mime_type: None,
            version_count: 1,
            current_version: 1,
            parent_id: upload.parent_id,
            updated_at: Utc::now(),
        });
        self.state
            .lock()
            .await
            .entries
            .entry(upload.parent_id)
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn delete_entry(&self, entry_id: EntryId) -> AppResult<()> {
        if self.take_failure("delete_entry").await {
            return Err(network("delete entry"));
        }
        let mut state = self.state.lock().await;
        for entries in state.entries.values_mut() {
            entries.retain(|e| e.id() != entry_id);
        }
        Ok(())
    }

    async fn create_folder(&self, name: &str, parent_id: Option<EntryId>) -> AppResult<Entry> {
        if self.take_failure("create_folder").await {
            return Err(AppError::conflict("folder 'reports' already exists"));
        }
        let entry = Entry::Folder(FolderEntry {
            id: EntryId::new(),
            name: name.to_string(),
            parent_id,
            updated_at: Utc::now(),
        });
        self.state
            .lock()
            .await
            .entries
            .entry(parent_id)
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn download_file(&self, _file_id: EntryId) -> AppResult<Bytes> {
        if self.take_failure("download_file").await {
            return Err(network("download file"));
        }
        Ok(Bytes::from_static(b"current content"))
    }

    async fn list_versions(&self, file_id: EntryId) -> AppResult<Vec<Version>> {
        if self.take_failure("list_versions").await {
            return Err(network("list versions"));
        }
        Ok(self
            .state
            .lock()
            .await
            .versions
            .get(&file_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn download_version(&self, _file_id: EntryId, version_number: i32) -> AppResult<Bytes> {
        self.download_version_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self
            .state
            .lock()
            .await
            .held_downloads
            .remove(&version_number);
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.take_failure("download_version").await {
            return Err(network("download version"));
        }
        Ok(Bytes::from(format!("version {version_number}")))
    }

    async fn restore_version(&self, file_id: EntryId, version_number: i32) -> AppResult<()> {
        if self.take_failure("restore").await {
            return Err(network("restore version"));
        }
        let mut state = self.state.lock().await;
        let versions = state
            .versions
            .get_mut(&file_id)
            .ok_or_else(|| AppError::not_found("file not found"))?;
        if !versions.iter().any(|v| v.version_number == version_number) {
            return Err(AppError::not_found("version not found"));
        }
        for v in versions.iter_mut() {
            v.is_current = v.version_number == version_number;
        }
        Ok(())
    }

    async fn delete_version(&self, file_id: EntryId, version_number: i32) -> AppResult<()> {
        self.delete_version_calls.fetch_add(1, Ordering::SeqCst);
        if self.take_failure("delete_version").await {
            return Err(AppError::conflict("cannot delete the current version"));
        }
        let mut state = self.state.lock().await;
        let versions = state
            .versions
            .get_mut(&file_id)
            .ok_or_else(|| AppError::not_found("file not found"))?;
        versions.retain(|v| v.version_number != version_number);
        Ok(())
    }
}

/// [`DownloadSink`] that records delivered names.
#[derive(Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<(String, usize)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn saved_names(&self) -> Vec<String> {
        self.saved.lock().await.iter().map(|(n, _)| n.clone()).collect()
    }
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn save(&self, name: &str, content: Bytes) -> AppResult<()> {
        self.saved.lock().await.push((name.to_string(), content.len()));
        Ok(())
    }
}

/// A folder entry fixture.
pub fn folder_entry(name: &str) -> Entry {
    Entry::Folder(FolderEntry {
        id: EntryId::new(),
        name: name.to_string(),
        parent_id: None,
        updated_at: Utc::now(),
    })
}

/// A file entry fixture with the given version count.
pub fn file_entry(name: &str, version_count: i32) -> Entry {
    Entry::File(FileEntry {
        id: EntryId::new(),
        name: name.to_string(),
        size: 64,
        mime_type: None,
        version_count,
        current_version: version_count,
        parent_id: None,
        updated_at: Utc::now(),
    })
}

/// A version fixture.
pub fn version(number: i32, is_current: bool) -> Version {
    Version {
        version_number: number,
        size: 128,
        mime_type: None,
        uploaded_at: Utc::now(),
        comment: None,
        is_current,
    }
}
