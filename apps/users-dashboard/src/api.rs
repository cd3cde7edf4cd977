//! Typed access to the user directory REST API.
//!
//! Every non-2xx response becomes an [`ApiError`] rebuilt from the server's
//! JSON error body; requests that never reach the server carry status `0`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, Instrument, Level};
use url::Url;

pub type UserId = i64;

/// A user as the backend serializes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub company: String,
    pub address: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} (status {status_code})")]
pub struct ApiError {
    pub message: String,
    pub status_code: u16,
    pub details: Option<Value>,
}

impl ApiError {
    /// Status used when no HTTP response was received.
    pub const NETWORK_STATUS: u16 = 0;

    pub fn network(cause: impl std::fmt::Display) -> Self {
        Self {
            message: cause.to_string(),
            status_code: Self::NETWORK_STATUS,
            details: None,
        }
    }

    pub fn is_network(&self) -> bool {
        self.status_code == Self::NETWORK_STATUS
    }

    /// Build from a failed response body. `error` wins over `message`; a body
    /// that is not a JSON object falls back to the status text.
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let json: Option<Value> = serde_json::from_slice(body).ok();
        let text_field = |key: &str| {
            json.as_ref()
                .and_then(|v| v.get(key))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        let message = text_field("error")
            .or_else(|| text_field("message"))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        let details = json
            .as_ref()
            .and_then(|v| v.get("details"))
            .filter(|d| !d.is_null())
            .cloned();
        Self {
            message,
            status_code: status.as_u16(),
            details,
        }
    }
}

/// What the dashboard needs from the backend.
#[async_trait]
pub trait UsersBackend: Send + Sync {
    /// An absent or empty query lists everybody.
    async fn fetch_users(&self, query: Option<&str>) -> Result<Vec<User>, ApiError>;

    async fn delete_user(&self, id: UserId) -> Result<(), ApiError>;
}

/// `reqwest` implementation of [`UsersBackend`]. No retries and no timeout.
#[derive(Clone)]
pub struct UsersApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl UsersApiClient {
    /// `base_url` points at the API root, e.g. `http://localhost:4000/api`.
    pub fn new(base_url: &Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Self {
        Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let req = req.build().map_err(ApiError::network)?;
        let span = tracing::span!(
            Level::DEBUG, "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = tracing::field::Empty,
        );

        let response = self
            .http
            .execute(req)
            .instrument(span.clone())
            .await
            .map_err(|e| {
                debug!(parent: &span, error = %e, "request did not reach the server");
                ApiError::network(e)
            })?;
        span.record("http.status_code", response.status().as_u16());

        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                debug!(parent: &span, error = %e, "failed to read error body");
                Default::default()
            }
        };
        Err(ApiError::from_body(status, &body))
    }
}

#[async_trait]
impl UsersBackend for UsersApiClient {
    #[instrument(name = "users_dashboard.api.fetch_users", skip(self))]
    async fn fetch_users(&self, query: Option<&str>) -> Result<Vec<User>, ApiError> {
        let mut req = self
            .http
            .request(Method::GET, format!("{}/users", self.base_url));
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            req = req.query(&[("q", q)]);
        }
        let response = self.send(req).await?;
        let status = response.status();
        let users: Vec<User> = response.json().await.map_err(|e| ApiError {
            message: format!("Invalid response body: {e}"),
            status_code: status.as_u16(),
            details: None,
        })?;
        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    #[instrument(name = "users_dashboard.api.delete_user", skip(self))]
    async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        let req = self
            .http
            .request(Method::DELETE, format!("{}/users/{id}", self.base_url));
        self.send(req).await?;
        Ok(())
    }
}
