//! Session persistence backends.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use cloudbox_core::result::AppResult;
use cloudbox_entity::profile::SessionProfile;

/// The durable form of an authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Bearer token injected into API requests.
    pub token: String,
    /// The authenticated user's profile.
    pub profile: SessionProfile,
}

/// Storage backend for the session lifecycle.
///
/// `load` is called once at startup (hydrate), `save` on every login or
/// profile refresh, `clear` on logout.
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    /// Read the previously persisted session, if any.
    async fn load(&self) -> AppResult<Option<PersistedSession>>;

    /// Persist the session.
    async fn save(&self, session: &PersistedSession) -> AppResult<()>;

    /// Remove the persisted session.
    async fn clear(&self) -> AppResult<()>;
}

/// JSON-file persistence, the terminal analogue of browser local storage.
#[derive(Debug, Clone)]
pub struct JsonFileSession {
    /// Path of the session file.
    path: PathBuf,
}

impl JsonFileSession {
    /// Create a file-backed session persistence at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionPersistence for JsonFileSession {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => {
                let session = serde_json::from_slice(&raw)?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, raw).await?;
        debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory persistence for tests.
#[derive(Debug, Default)]
pub struct MemorySession {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemorySession {
    /// Create an empty in-memory persistence.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionPersistence for MemorySession {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        *self.inner.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.inner.lock().await = None;
        Ok(())
    }
}
