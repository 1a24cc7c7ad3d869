//! HTTP implementation of the entry repository contract.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use cloudbox_core::config::api::ApiConfig;
use cloudbox_core::result::AppResult;
use cloudbox_core::types::EntryId;
use cloudbox_entity::entry::Entry;
use cloudbox_entity::version::Version;
use cloudbox_session::SessionStore;

use crate::repository::{EntryRepository, FileUpload};
use crate::transport::Transport;
use crate::wire::{EntryRecord, VersionRecord};

/// [`EntryRepository`] backed by the CloudBox API gateway.
#[derive(Clone)]
pub struct HttpEntryRepository {
    transport: Transport,
}

impl HttpEntryRepository {
    /// Build a repository client from configuration and the session store
    /// that supplies the bearer token.
    pub fn new(config: &ApiConfig, session: SessionStore) -> AppResult<Self> {
        Ok(Self {
            transport: Transport::new(config, session)?,
        })
    }

    pub(crate) fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl EntryRepository for HttpEntryRepository {
    async fn list_entries(&self, folder_id: Option<EntryId>) -> AppResult<Vec<Entry>> {
        let mut request = self.transport.get("/files/");
        if let Some(id) = folder_id {
            request = request.query(&[("parent_id", id.to_string())]);
        }
        let records: Vec<EntryRecord> = self
            .transport
            .send_enveloped(request, "failed to list entries")
            .await?;
        Ok(records.into_iter().map(Entry::from).collect())
    }

    async fn upload_file(&self, upload: FileUpload) -> AppResult<Entry> {
        let mime = mime_guess::from_path(&upload.name)
            .first_or_octet_stream()
            .to_string();
        let part = reqwest::multipart::Part::bytes(upload.content.to_vec())
            .file_name(upload.name.clone())
            .mime_str(&mime)
            .map_err(|e| {
                cloudbox_core::AppError::with_source(
                    cloudbox_core::error::ErrorKind::Validation,
                    format!("invalid MIME type for '{}': {e}", upload.name),
                    e,
                )
            })?;
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(parent) = upload.parent_id {
            form = form.text("parent_id", parent.to_string());
        }

        let request = self.transport.post("/files/upload").multipart(form);
        let record: EntryRecord = self
            .transport
            .send_enveloped(request, "failed to upload file")
            .await?;
        info!(name = %upload.name, size = upload.content.len(), "File uploaded");
        Ok(Entry::from(record))
    }

    async fn delete_entry(&self, entry_id: EntryId) -> AppResult<()> {
        let request = self.transport.delete(&format!("/files/{entry_id}"));
        self.transport
            .send_expect_ok(request, "failed to delete entry")
            .await
    }

    async fn create_folder(&self, name: &str, parent_id: Option<EntryId>) -> AppResult<Entry> {
        let body = serde_json::json!({
            "name": name,
            "parent_id": parent_id,
        });
        let request = self.transport.post("/files/folders").json(&body);
        let record: EntryRecord = self
            .transport
            .send_enveloped(request, "failed to create folder")
            .await?;
        info!(name, "Folder created");
        Ok(Entry::from(record))
    }

    async fn download_file(&self, file_id: EntryId) -> AppResult<Bytes> {
        let request = self.transport.get(&format!("/files/{file_id}/download"));
        self.transport
            .send_bytes(request, "failed to download file")
            .await
    }

    async fn list_versions(&self, file_id: EntryId) -> AppResult<Vec<Version>> {
        let request = self.transport.get(&format!("/files/{file_id}/versions"));
        let records: Vec<VersionRecord> = self
            .transport
            .send_enveloped(request, "failed to list versions")
            .await?;
        Ok(records.into_iter().map(Version::from).collect())
    }

    async fn download_version(&self, file_id: EntryId, version_number: i32) -> AppResult<Bytes> {
        let request = self
            .transport
            .get(&format!("/files/{file_id}/versions/{version_number}/download"));
        self.transport
            .send_bytes(request, "failed to download version")
            .await
    }

    async fn restore_version(&self, file_id: EntryId, version_number: i32) -> AppResult<()> {
        let request = self
            .transport
            .post(&format!("/files/{file_id}/versions/{version_number}/restore"));
        self.transport
            .send_expect_ok(request, "failed to restore version")
            .await?;
        info!(%file_id, version_number, "Version restored");
        Ok(())
    }

    async fn delete_version(&self, file_id: EntryId, version_number: i32) -> AppResult<()> {
        let request = self
            .transport
            .delete(&format!("/files/{file_id}/versions/{version_number}"));
        self.transport
            .send_expect_ok(request, "failed to delete version")
            .await?;
        info!(%file_id, version_number, "Version deleted");
        Ok(())
    }
}
