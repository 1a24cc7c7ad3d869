//! End-to-end workflow tests: all controllers wired over one in-memory
//! repository, exercising the flows a user walks through in a session.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::Mutex;

use cloudbox_client::{EntryRepository, FileUpload};
use cloudbox_controller::{
    EntryList, FolderNavigator, TargetFile, UploadOrchestrator, VersionController,
};
use cloudbox_core::error::AppError;
use cloudbox_core::result::AppResult;
use cloudbox_core::traits::DownloadSink;
use cloudbox_core::types::EntryId;
use cloudbox_entity::entry::{Entry, FileEntry, FolderEntry};
use cloudbox_entity::version::Version;

/// In-memory stand-in for the API gateway. Uploading a name that already
/// exists in the folder appends a new version, as the real server does.
#[derive(Default)]
struct FakeServer {
    state: Mutex<ServerState>,
}

#[derive(Default)]
struct ServerState {
    entries: HashMap<Option<EntryId>, Vec<Entry>>,
    versions: HashMap<EntryId, Vec<Version>>,
}

impl ServerState {
    fn find_file_mut(&mut self, folder: Option<EntryId>, name: &str) -> Option<&mut FileEntry> {
        self.entries.get_mut(&folder)?.iter_mut().find_map(|e| match e {
            Entry::File(f) if f.name == name => Some(f),
            _ => None,
        })
    }
}

#[async_trait]
impl EntryRepository for FakeServer {
    async fn list_entries(&self, folder_id: Option<EntryId>) -> AppResult<Vec<Entry>> {
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
        let mut state = self.state.lock().await;
        if let Some(file) = state.find_file_mut(upload.parent_id, &upload.name) {
            file.version_count += 1;
            file.current_version = file.version_count;
            file.size = upload.content.len() as i64;
            file.updated_at = Utc::now();
            let (id, number, size) = (file.id, file.current_version, file.size);
            let entry = Entry::File(file.clone());
            let versions = state.versions.entry(id).or_default();
            for v in versions.iter_mut() {
                v.is_current = false;
            }
            versions.push(Version {
                version_number: number,
                size,
                mime_type: None,
                uploaded_at: Utc::now(),
                comment: None,
                is_current: true,
            });
            return Ok(entry);
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
        state.versions.insert(
            entry.id(),
            vec![Version {
                version_number: 1,
                size: upload.content.len() as i64,
                mime_type: None,
                uploaded_at: Utc::now(),
                comment: None,
                is_current: true,
            }],
        );
        state
            .entries
            .entry(upload.parent_id)
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn delete_entry(&self, entry_id: EntryId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        for entries in state.entries.values_mut() {
            entries.retain(|e| e.id() != entry_id);
        }
        state.versions.remove(&entry_id);
        Ok(())
    }

    async fn create_folder(&self, name: &str, parent_id: Option<EntryId>) -> AppResult<Entry> {
        let mut state = self.state.lock().await;
        let siblings = state.entries.entry(parent_id).or_default();
        if siblings.iter().any(|e| e.is_folder() && e.name() == name) {
            return Err(AppError::conflict(format!("folder '{name}' already exists")));
        }
        let entry = Entry::Folder(FolderEntry {
            id: EntryId::new(),
            name: name.to_string(),
            parent_id,
            updated_at: Utc::now(),
        });
        siblings.push(entry.clone());
        Ok(entry)
    }

    async fn download_file(&self, _file_id: EntryId) -> AppResult<Bytes> {
        Ok(Bytes::from_static(b"current"))
    }

    async fn list_versions(&self, file_id: EntryId) -> AppResult<Vec<Version>> {
        self.state
            .lock()
            .await
            .versions
            .get(&file_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("file not found"))
    }

    async fn download_version(&self, _file_id: EntryId, version_number: i32) -> AppResult<Bytes> {
        Ok(Bytes::from(format!("v{version_number}")))
    }

    async fn restore_version(&self, file_id: EntryId, version_number: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let versions = state
            .versions
            .get_mut(&file_id)
            .ok_or_else(|| AppError::not_found("file not found"))?;
        for v in versions.iter_mut() {
            v.is_current = v.version_number == version_number;
        }
        Ok(())
    }

    async fn delete_version(&self, file_id: EntryId, version_number: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let versions = state
            .versions
            .get_mut(&file_id)
            .ok_or_else(|| AppError::not_found("file not found"))?;
        if versions
            .iter()
            .any(|v| v.version_number == version_number && v.is_current)
        {
            return Err(AppError::conflict("cannot delete the current version"));
        }
        versions.retain(|v| v.version_number != version_number);
        Ok(())
    }
}

#[derive(Default)]
struct NullSink;

#[async_trait]
impl DownloadSink for NullSink {
    async fn save(&self, _name: &str, _content: Bytes) -> AppResult<()> {
        Ok(())
    }
}

struct Client {
    navigator: FolderNavigator,
    entries: EntryList,
    orchestrator: UploadOrchestrator,
    versions: VersionController,
}

fn client() -> Client {
    let repo: Arc<dyn EntryRepository> = Arc::new(FakeServer::default());
    let sink: Arc<dyn DownloadSink> = Arc::new(NullSink);
    let entries = EntryList::new(repo.clone());
    Client {
        navigator: FolderNavigator::new(entries.clone()),
        orchestrator: UploadOrchestrator::new(repo.clone(), sink.clone(), entries.clone()),
        versions: VersionController::new(repo, sink, entries.clone()),
        entries,
    }
}

#[tokio::test]
async fn test_folder_and_upload_workflow() {
    let client = client();
    client.navigator.jump_to(0).await.expect("load root");

    // Create a folder at the root and descend into it.
    let folder = client
        .orchestrator
        .create_folder("projects", None)
        .await
        .expect("create folder");
    client.navigator.open(&folder).await.expect("open folder");
    assert!(client.entries.entries().await.is_empty());

    // Duplicate folder names within the same parent are rejected.
    let err = client
        .orchestrator
        .create_folder("projects", None)
        .await
        .expect_err("duplicate name");
    assert_eq!(err.message, "folder 'projects' already exists");

    // Stage and commit an upload into the open folder.
    client
        .orchestrator
        .stage("plan.txt", Bytes::from_static(b"v1"))
        .await
        .expect("stage");
    client
        .orchestrator
        .commit_upload(Some(folder.id()))
        .await
        .expect("commit");

    let entries = client.entries.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name(), "plan.txt");

    // Deleting the file refreshes the list.
    client
        .orchestrator
        .delete_entry(entries[0].id())
        .await
        .expect("delete");
    assert!(client.entries.entries().await.is_empty());
}

#[tokio::test]
async fn test_version_lifecycle_workflow() {
    let client = client();
    client.navigator.jump_to(0).await.expect("load root");

    // Upload the same name twice: the second becomes version 2.
    for content in [&b"first"[..], &b"second"[..]] {
        client
            .orchestrator
            .stage("notes.md", Bytes::copy_from_slice(content))
            .await
            .expect("stage");
        client.orchestrator.commit_upload(None).await.expect("commit");
    }

    let entries = client.entries.entries().await;
    let file = entries[0].as_file().expect("file entry");
    assert_eq!(file.version_count, 2);
    assert_eq!(file.current_version, 2);

    // Open the version history and make version 1 current again.
    client
        .versions
        .load(TargetFile {
            id: file.id,
            name: file.name.clone(),
        })
        .await
        .expect("load versions");
    client.versions.request_restore(1).await.expect("request");
    client.versions.confirm().await.expect("confirm");

    let versions = client.versions.versions().await;
    let current: Vec<i32> = versions
        .iter()
        .filter(|v| v.is_current)
        .map(|v| v.version_number)
        .collect();
    assert_eq!(current, vec![1]);

    // Version 2 is no longer current and can now be deleted.
    client.versions.request_delete(2).await.expect("request");
    client.versions.confirm().await.expect("confirm delete");
    assert_eq!(client.versions.versions().await.len(), 1);
}
