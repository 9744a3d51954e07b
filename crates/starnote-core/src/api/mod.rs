//! REST client for the Starnote sync server.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AuthSession, Note, NoteId, SyncRequest, SyncResponse};
use crate::util::{compact_text, is_http_url, non_blank};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API error: {0}")]
    Api(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Fixed connect and whole-request timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Account as the server reports it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct AuthResponse {
    id: String,
    username: String,
    #[serde(default)]
    email: Option<String>,
    token: Option<String>,
}

impl TryFrom<AuthResponse> for AuthSession {
    type Error = ApiError;

    fn try_from(value: AuthResponse) -> ApiResult<Self> {
        let token = non_blank(value.token)
            .ok_or_else(|| ApiError::Api("Auth response did not include a token".to_string()))?;
        Ok(Self {
            token,
            user_id: value.id,
            username: value.username,
            email: non_blank(value.email),
        })
    }
}

/// Account endpoints
#[allow(async_fn_in_trait)]
pub trait AccountApi {
    async fn register(&self, request: &RegisterRequest<'_>) -> ApiResult<AuthSession>;

    async fn login(&self, request: &LoginRequest<'_>) -> ApiResult<AuthSession>;

    async fn update_profile(
        &self,
        token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<RemoteUser>;
}

/// Note endpoints
#[allow(async_fn_in_trait)]
pub trait NotesApi {
    /// Post the whole local collection, receive the server's collection
    async fn sync_notes(&self, token: &str, request: &SyncRequest) -> ApiResult<SyncResponse>;

    async fn upsert_note(&self, token: &str, note: &Note) -> ApiResult<()>;

    async fn delete_note(&self, token: &str, id: &NoteId) -> ApiResult<()>;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>, timeouts: HttpTimeouts) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.as_ref())?;
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.request)
            .build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(request: RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = request.header("Accept", "application/json").send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(parse_api_error(status, &body)));
        }
        Ok(response)
    }
}

impl AccountApi for ApiClient {
    async fn register(&self, request: &RegisterRequest<'_>) -> ApiResult<AuthSession> {
        let response = Self::send(self.client.post(self.url("/api/auth/register")).json(request))
            .await?;
        response.json::<AuthResponse>().await?.try_into()
    }

    async fn login(&self, request: &LoginRequest<'_>) -> ApiResult<AuthSession> {
        let response =
            Self::send(self.client.post(self.url("/api/auth/login")).json(request)).await?;
        response.json::<AuthResponse>().await?.try_into()
    }

    async fn update_profile(
        &self,
        token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<RemoteUser> {
        let request = self
            .client
            .put(self.url(&format!("/api/users/{user_id}")))
            .bearer_auth(token)
            .json(update);
        Ok(Self::send(request).await?.json::<RemoteUser>().await?)
    }
}

impl NotesApi for ApiClient {
    async fn sync_notes(&self, token: &str, request: &SyncRequest) -> ApiResult<SyncResponse> {
        let request = self
            .client
            .post(self.url("/api/notes/sync"))
            .bearer_auth(token)
            .json(request);
        let body = Self::send(request).await?.text().await?;
        parse_sync_response(&body)
    }

    async fn upsert_note(&self, token: &str, note: &Note) -> ApiResult<()> {
        let request = self
            .client
            .put(self.url(&format!("/api/notes/{}", note.id)))
            .bearer_auth(token)
            .json(note);
        Self::send(request).await?;
        Ok(())
    }

    async fn delete_note(&self, token: &str, id: &NoteId) -> ApiResult<()> {
        let request = self
            .client
            .delete(self.url(&format!("/api/notes/{id}")))
            .bearer_auth(token);
        Self::send(request).await?;
        Ok(())
    }
}

/// Decode a sync body; an empty body counts as a bare success
pub fn parse_sync_response(body: &str) -> ApiResult<SyncResponse> {
    if body.trim().is_empty() {
        return Ok(SyncResponse {
            success: true,
            message: None,
            notes: None,
        });
    }
    Ok(serde_json::from_str(body)?)
}

pub fn normalize_base_url(url: &str) -> ApiResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidConfiguration("API URL must not be empty"));
    }
    if !is_http_url(trimmed) {
        return Err(ApiError::InvalidConfiguration(
            "API URL must include http:// or https://",
        ));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
