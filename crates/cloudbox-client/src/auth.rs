//! Authentication and profile API.
//!
//! Session persistence itself lives in `cloudbox-session`; this module only
//! performs the HTTP exchanges that produce or refresh a session.

use serde::{Deserialize, Serialize};
use tracing::info;

use cloudbox_core::config::api::ApiConfig;
use cloudbox_core::result::AppResult;
use cloudbox_entity::profile::SessionProfile;
use cloudbox_session::SessionStore;

use crate::http::HttpEntryRepository;
use crate::transport::Transport;

/// New-account registration request.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// E-mail address (login identity).
    pub email: String,
    /// Display name, 3-50 characters server-side.
    pub username: String,
    /// Plaintext password, hashed server-side.
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
    user: SessionProfile,
}

/// Client for the auth and user services.
#[derive(Clone)]
pub struct AuthApi {
    transport: Transport,
}

impl AuthApi {
    /// Build an auth client from configuration and the session store.
    pub fn new(config: &ApiConfig, session: SessionStore) -> AppResult<Self> {
        Ok(Self {
            transport: Transport::new(config, session)?,
        })
    }

    /// An entry repository sharing this client's transport.
    pub fn entry_repository(&self) -> HttpEntryRepository {
        HttpEntryRepository::from_transport(self.transport.clone())
    }

    /// Exchange credentials for a bearer token and profile.
    ///
    /// The caller is responsible for installing the pair into the session
    /// store; this method performs no session mutation itself.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, SessionProfile)> {
        let body = serde_json::json!({ "email": email, "password": password });
        let request = self.transport.post("/auth/login").json(&body);
        let data: LoginData = self
            .transport
            .send_enveloped(request, "login failed")
            .await?;
        info!(user = %data.user.username, "Login succeeded");
        Ok((data.token, data.user))
    }

    /// Create a new account.
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<SessionProfile> {
        let http = self.transport.post("/auth/register").json(request);
        self.transport
            .send_enveloped(http, "registration failed")
            .await
    }

    /// Fetch the authenticated user's profile (quota refresh).
    pub async fn me(&self) -> AppResult<SessionProfile> {
        let request = self.transport.get("/users/me");
        self.transport
            .send_enveloped(request, "failed to fetch profile")
            .await
    }
}
