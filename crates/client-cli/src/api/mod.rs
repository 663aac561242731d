//! Gateway to the backend REST API.
//!
//! Every request goes through [`ApiClient`], which attaches the persisted
//! bearer token and classifies failed exchanges in one place:
//!
//! * 401 purges the persisted session and asks the user to sign in again
//! * 429, 5xx, timeouts and network failures raise a notice
//! * everything else is handed back to the call site untouched
//!
//! Endpoint groups live in the submodules and stay declarative.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::ErrorDetail;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

use crate::config::{DEFAULT_SERVER, DEFAULT_TIMEOUT_SECS};
use crate::notify::{Notice, Notifier};
use crate::session::SessionState;
use crate::storage::CredentialStore;

mod admin;
mod auth;
mod content;
mod projects;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use content::{image_extension, ContentApi};
pub use projects::{ImageUpload, ProjectsApi};

/// Fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authenticated")]
    Unauthorized(ErrorDetail),

    #[error("rate limit exceeded")]
    RateLimited(ErrorDetail),

    #[error("server error ({status})")]
    Server { status: u16, detail: ErrorDetail },

    #[error("request failed with status {status}")]
    Status { status: u16, detail: ErrorDetail },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::RateLimited(_) => Some(429),
            ApiError::Server { status, .. } | ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            ApiError::Unauthorized(detail) | ApiError::RateLimited(detail) => Some(detail),
            ApiError::Server { detail, .. } | ApiError::Status { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Text to show the user for this failure
    pub fn user_message(&self, fallback: &str) -> String {
        match self.detail() {
            Some(detail) => detail.normalize(fallback),
            None => match self {
                ApiError::Timeout | ApiError::Network(_) => self.to_string(),
                _ => fallback.to_string(),
            },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    session: watch::Sender<SessionState>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let (session, _) = watch::channel(SessionState::pending());

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                storage,
                notifier,
                session,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(self)
    }

    pub fn content(&self) -> ContentApi<'_> {
        ContentApi::new(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    pub(crate) fn storage(&self) -> &dyn CredentialStore {
        self.inner.storage.as_ref()
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    pub(crate) fn session(&self) -> &watch::Sender<SessionState> {
        &self.inner.session
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// Request builder with the persisted bearer token attached
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.inner.http.request(method, self.url(path));
        match self.inner.storage.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and apply the response policy
    pub(crate) async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.transport_failure(e)),
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.bytes().await.unwrap_or_default();
        let detail = ErrorDetail::from_body(&body);
        tracing::debug!("{} {} -> {:?}", status.as_u16(), url, detail);

        Err(self.classify(status, detail))
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Err(self.transport_failure(e)),
        };
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send_json(self.request(Method::GET, path)).await
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::GET, path).query(query)).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.request(Method::POST, path).json(body)).await
    }

    pub(crate) async fn put_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.request(Method::PUT, path).json(body)).await
    }

    /// Body-less request with a JSON response (POST/PUT/DELETE actions)
    pub(crate) async fn call<T: DeserializeOwned>(&self, method: Method, path: &str) -> ApiResult<T> {
        self.send_json(self.request(method, path)).await
    }

    fn classify(&self, status: StatusCode, detail: ErrorDetail) -> ApiError {
        match status {
            StatusCode::UNAUTHORIZED => {
                self.expire_session();
                ApiError::Unauthorized(detail)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                self.inner.notifier.notify(Notice::RateLimited);
                ApiError::RateLimited(detail)
            }
            s if s.is_server_error() => {
                self.inner.notifier.notify(Notice::ServerError);
                ApiError::Server {
                    status: s.as_u16(),
                    detail,
                }
            }
            s => ApiError::Status {
                status: s.as_u16(),
                detail,
            },
        }
    }

    fn transport_failure(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            tracing::warn!("Request timed out: {}", e);
            self.inner.notifier.notify(Notice::Timeout);
            ApiError::Timeout
        } else {
            tracing::warn!("Request failed: {}", e);
            self.inner.notifier.notify(Notice::Offline);
            ApiError::Network(e)
        }
    }

    /// Drop the persisted credential and the in-memory session, then send the user to sign in.
    /// Requests sent without a credential (a rejected sign-in) raise no notice.
    fn expire_session(&self) {
        let had_credential = self.inner.storage.token().is_some();
        tracing::warn!("Server rejected credentials, clearing session");
        if let Err(e) = self.inner.storage.purge() {
            tracing::error!("Failed to clear persisted session: {}", e);
        }
        self.inner.session.send_modify(|state| state.sign_out());
        if had_credential {
            self.inner.notifier.notify(Notice::SignInRequired);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::SilentNotifier;
    use crate::storage::MemoryStore;

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ApiError::Status {
            status: 400,
            detail: ErrorDetail::PlainMessage("Email already registered".to_string()),
        };
        assert_eq!(err.user_message("Registration failed"), "Email already registered");
        assert_eq!(err.status(), Some(400));

        let err = ApiError::Server {
            status: 502,
            detail: ErrorDetail::Unknown,
        };
        assert_eq!(err.user_message("Login failed"), "Login failed");

        assert_eq!(ApiError::Timeout.user_message("Login failed"), "request timed out");
        assert_eq!(ApiError::Decode("eof".into()).user_message("Login failed"), "Login failed");
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new(
            ClientConfig {
                base_url: "http://localhost:8000/api/v1/".to_string(),
                timeout: Duration::from_secs(1),
            },
            Arc::new(MemoryStore::new()),
            Arc::new(SilentNotifier),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/v1");
        assert_eq!(client.url("/auth/me"), "http://localhost:8000/api/v1/auth/me");
    }
}
