//! Shared HTTP transport with bearer-token injection and error mapping.

use bytes::Bytes;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use cloudbox_core::config::api::ApiConfig;
use cloudbox_core::error::{AppError, ErrorKind};
use cloudbox_core::result::AppResult;
use cloudbox_session::SessionStore;

use crate::wire::ApiEnvelope;

/// Thin wrapper around `reqwest::Client` shared by all API surfaces.
#[derive(Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl Transport {
    /// Build a transport from configuration.
    pub fn new(config: &ApiConfig, session: SessionStore) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET request handler.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    /// POST request handler.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    /// DELETE request handler.
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    /// Send a request with the session token attached, mapping transport
    /// failures and non-2xx statuses into [`AppError`].
    ///
    /// For error statuses the server-supplied envelope message is
    /// preferred over the per-operation `fallback`.
    pub async fn send(&self, request: RequestBuilder, fallback: &str) -> AppResult<reqwest::Response> {
        let request = match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            AppError::with_source(ErrorKind::Network, format!("{fallback}: {e}"), e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ApiEnvelope<serde_json::Value>>()
            .await
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| fallback.to_string());
        debug!(%status, %message, "API request failed");
        Err(AppError::new(kind_for_status(status), message))
    }

    /// Send a request and decode an enveloped JSON payload.
    pub async fn send_enveloped<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> AppResult<T> {
        let response = self.send(request, fallback).await?;
        let envelope: ApiEnvelope<T> = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("{fallback}: malformed response: {e}"),
                e,
            )
        })?;
        envelope.into_data(fallback)
    }

    /// Send a request whose enveloped response carries no payload.
    pub async fn send_expect_ok(&self, request: RequestBuilder, fallback: &str) -> AppResult<()> {
        let response = self.send(request, fallback).await?;
        let envelope: ApiEnvelope<serde_json::Value> = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("{fallback}: malformed response: {e}"),
                e,
            )
        })?;
        if envelope.success {
            Ok(())
        } else {
            let message = envelope.error.unwrap_or_else(|| fallback.to_string());
            Err(AppError::internal(message))
        }
    }

    /// Send a request and return the raw body bytes (binary downloads).
    pub async fn send_bytes(&self, request: RequestBuilder, fallback: &str) -> AppResult<Bytes> {
        let response = self.send(request, fallback).await?;
        response.bytes().await.map_err(|e| {
            AppError::with_source(ErrorKind::Network, format!("{fallback}: {e}"), e)
        })
    }
}

/// Map an HTTP status to the client error taxonomy.
fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Authentication,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        StatusCode::BAD_REQUEST
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
        _ => ErrorKind::Internal,
    }
}
