//! API client for the AI Talk backend.
//!
//! Every request passes through two interceptors:
//!
//! - **request**: attach `Authorization: Bearer <token>` when the credential
//!   store holds a token, and enforce the request body ceiling
//! - **response**: resolve to the body payload on success; on 401 clear the
//!   stored session and redirect to the login view; on any other failure
//!   notify the user with the server's `detail` (or a generic message)
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use talk_core::auth::MemoryStore;
//! use talk_core::client::{ApiClient, ClientConfig};
//! use talk_core::Page;
//!
//! #[tokio::main]
//! async fn main() -> talk_core::Result<()> {
//!     let client = ApiClient::with_store(ClientConfig::default(), Arc::new(MemoryStore::new()))?;
//!     let conversations = client.conversations().list(Page::first(20)).await?;
//!     println!("{} conversations", conversations.len());
//!     Ok(())
//! }
//! ```

mod hooks;

pub use hooks::{LogNavigator, LogNotifier, Navigator, Notifier};

use crate::api::{AuthApi, ConversationApi, MessageApi};
use crate::auth::CredentialStore;
use crate::error::{Error, Result, GENERIC_FAILURE};
use crate::stream::{self, EventStream};
use bytes::{Bytes, BytesMut};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default base URL (dev server, proxied to the backend)
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default ceiling for request and response bodies
pub const DEFAULT_MAX_LENGTH: usize = 10_000_000;

/// Default location of the login view
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    /// Timeout for regular requests (not applied to event streams)
    pub timeout: Duration,
    /// Maximum accepted response body size in bytes
    pub max_content_length: usize,
    /// Maximum request body size in bytes
    pub max_body_length: usize,
    /// Where to send the user after a 401
    pub login_path: String,
    /// Maximum wait for a single event-stream chunk; `None` waits forever
    pub stream_idle_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_content_length: DEFAULT_MAX_LENGTH,
            max_body_length: DEFAULT_MAX_LENGTH,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            stream_idle_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Default configuration against another base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// API client for the AI Talk backend
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client with explicit side-effect capabilities
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        // No cookie store: credentials travel only in the Authorization header
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            http,
            store,
            navigator,
            notifier,
        })
    }

    /// Create a client that logs redirects and notifications
    pub fn with_store(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::new(config, store, Arc::new(LogNavigator), Arc::new(LogNotifier))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The credential store backing this client
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resource Views
    // ─────────────────────────────────────────────────────────────────────────

    /// Authentication endpoints
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Conversation endpoints
    pub fn conversations(&self) -> ConversationApi<'_> {
        ConversationApi::new(self)
    }

    /// Message endpoints of one conversation
    pub fn messages(&self, conversation_id: i64) -> MessageApi<'_> {
        MessageApi::new(self, conversation_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP Helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, u64)],
    ) -> Result<T> {
        let req = self.request(Method::GET, path).query(query);
        self.execute(req, path).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = self.json_body(self.request(Method::POST, path), body)?;
        self.execute(req, path).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = self.json_body(self.request(Method::PUT, path), body)?;
        self.execute(req, path).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let req = self.request(Method::DELETE, path);
        let _: serde_json::Value = self.execute(req, path).await?;
        Ok(())
    }

    /// POST `body` and decode the chunked `data:` response as events.
    ///
    /// This path bypasses the response interceptor: a failure status rejects
    /// with [`Error::Status`] without redirecting or notifying.
    pub(crate) async fn open_stream<T, B>(&self, path: &str, body: &B) -> Result<EventStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize,
    {
        let url = self.url(path);
        debug!("API stream: POST {}", url);

        let req = self.authorize(self.http.post(&url)).header(ACCEPT, "text/event-stream");
        let req = self.json_body(req, body)?;

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        Ok(stream::decode(resp.bytes_stream(), self.config.stream_idle_timeout))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("API request: {} {}", method, url);
        self.authorize(self.http.request(method, &url))
            .timeout(self.config.timeout)
    }

    /// Request interceptor
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.store.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn json_body<B: Serialize>(&self, req: RequestBuilder, body: &B) -> Result<RequestBuilder> {
        let encoded = serde_json::to_vec(body)?;
        if encoded.len() > self.config.max_body_length {
            return Err(Error::PayloadTooLarge {
                limit: self.config.max_body_length,
                actual: encoded.len(),
            });
        }
        Ok(req.header(CONTENT_TYPE, "application/json").body(encoded))
    }

    /// Response interceptor
    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T> {
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Request to {} failed: {}", path, e);
                self.notifier.error(GENERIC_FAILURE);
                return Err(Error::Http(e));
            }
        };

        let status = resp.status();
        // A rejected session is handled whatever the body holds
        if status == StatusCode::UNAUTHORIZED {
            return Err(self.reject(status, &[]));
        }

        let body = self.read_body(resp).await?;
        if !status.is_success() {
            return Err(self.reject(status, &body));
        }

        if body.is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Collect the body chunk by chunk, stopping once it passes the ceiling
    async fn read_body(&self, mut resp: Response) -> Result<Bytes> {
        if let Some(len) = resp.content_length() {
            self.check_content_length(len as usize)?;
        }

        let mut body = BytesMut::new();
        loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => {
                    self.check_content_length(body.len() + chunk.len())?;
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => return Ok(body.freeze()),
                Err(e) => {
                    self.notifier.error(GENERIC_FAILURE);
                    return Err(Error::Http(e));
                }
            }
        }
    }

    fn check_content_length(&self, len: usize) -> Result<()> {
        if len > self.config.max_content_length {
            self.notifier.error(GENERIC_FAILURE);
            return Err(Error::PayloadTooLarge {
                limit: self.config.max_content_length,
                actual: len,
            });
        }
        Ok(())
    }

    fn reject(&self, status: StatusCode, body: &[u8]) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.store.clear_session() {
                warn!("Failed to clear credentials after 401: {}", e);
            }
            self.navigator.redirect(&self.config.login_path);
            return Error::Unauthorized;
        }

        let message = error_detail(body).unwrap_or_else(|| GENERIC_FAILURE.to_string());
        self.notifier.error(&message);
        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// The `detail` string of an error body, if present
pub fn error_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(str::to_string)
}
