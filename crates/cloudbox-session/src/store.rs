//! The session state store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use cloudbox_core::result::AppResult;
use cloudbox_entity::profile::SessionProfile;

use crate::persistence::{PersistedSession, SessionPersistence};

/// Holds the auth token and current user profile for the process.
///
/// The store is the sole writer of session state. Reads are narrow
/// (`is_authenticated`, `current_profile`, `token`); everything else in
/// the client treats the session as opaque.
#[derive(Clone)]
pub struct SessionStore {
    /// In-memory session, `None` when logged out.
    inner: Arc<RwLock<Option<PersistedSession>>>,
    /// Durable backend.
    persistence: Arc<dyn SessionPersistence>,
}

impl SessionStore {
    /// Create a store over the given persistence backend.
    ///
    /// The store starts empty; call [`hydrate`](Self::hydrate) to restore
    /// a persisted session.
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            persistence,
        }
    }

    /// Restore the persisted session into memory, if one exists.
    pub async fn hydrate(&self) -> AppResult<()> {
        let restored = self.persistence.load().await?;
        let mut inner = self.inner.write().await;
        if let Some(session) = &restored {
            info!(user = %session.profile.username, "Session hydrated");
        }
        *inner = restored;
        Ok(())
    }

    /// Install a fresh session after login and persist it.
    pub async fn set_auth(&self, token: String, profile: SessionProfile) -> AppResult<()> {
        let session = PersistedSession { token, profile };
        self.persistence.save(&session).await?;
        let mut inner = self.inner.write().await;
        info!(user = %session.profile.username, "Session established");
        *inner = Some(session);
        Ok(())
    }

    /// Replace the stored profile (after a quota or account refresh),
    /// keeping the token.
    pub async fn update_profile(&self, profile: SessionProfile) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let Some(session) = inner.as_mut() else {
            return Ok(());
        };
        session.profile = profile;
        self.persistence.save(session).await
    }

    /// Clear the session from memory and the persistence backend.
    pub async fn logout(&self) -> AppResult<()> {
        self.persistence.clear().await?;
        let mut inner = self.inner.write().await;
        if inner.take().is_some() {
            info!("Session cleared");
        }
        Ok(())
    }

    /// Whether an authenticated session is active.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// The current user's profile, if authenticated.
    pub async fn current_profile(&self) -> Option<SessionProfile> {
        self.inner.read().await.as_ref().map(|s| s.profile.clone())
    }

    /// The bearer token, if authenticated.
    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|s| s.token.clone())
    }
}
