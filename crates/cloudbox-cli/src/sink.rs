//! Filesystem download sink.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use cloudbox_core::result::AppResult;
use cloudbox_core::traits::DownloadSink;

/// Writes downloaded content into the configured downloads directory.
pub struct FsDownloadSink {
    directory: PathBuf,
}

impl FsDownloadSink {
    /// Create a sink writing into `directory` (created on demand).
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl DownloadSink for FsDownloadSink {
    async fn save(&self, name: &str, content: Bytes) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(name);
        tokio::fs::write(&path, &content).await?;
        info!(path = %path.display(), size = content.len(), "Download saved");
        Ok(())
    }
}
