//! Authentication endpoints.

use crate::auth::{TOKEN_KEY, USER_KEY};
use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{LoginRequest, RegisterRequest, TokenResponse, User};
use tracing::{info, warn};

/// `/auth` endpoints
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Register a new account
    pub async fn register(&self, req: &RegisterRequest) -> Result<User> {
        self.client.post("/auth/register", req).await
    }

    /// Log in and store the issued token for subsequent requests
    pub async fn login(&self, req: &LoginRequest) -> Result<TokenResponse> {
        let token: TokenResponse = self.client.post("/auth/login", req).await?;
        self.client.store().set(TOKEN_KEY, &token.access_token)?;
        info!("Logged in as {}", req.username);
        Ok(token)
    }

    /// The user owning the current token; cached in the store on success
    pub async fn current_user(&self) -> Result<User> {
        let user: User = self.client.get("/auth/me", &[]).await?;
        match serde_json::to_string(&user) {
            Ok(encoded) => {
                if let Err(e) = self.client.store().set(USER_KEY, &encoded) {
                    warn!("Failed to cache current user: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode current user: {}", e),
        }
        Ok(user)
    }

    /// The user cached by the last successful [`current_user`](Self::current_user)
    pub fn cached_user(&self) -> Option<User> {
        let raw = self.client.store().get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Forget the stored session. The backend keeps no session state.
    pub fn logout(&self) -> Result<()> {
        self.client.store().clear_session()
    }

    /// Whether a token is stored
    pub fn is_logged_in(&self) -> bool {
        self.client.store().token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::{CredentialStore, MemoryStore, TOKEN_KEY, USER_KEY};
    use crate::testing::{spawn_backend, Recorder};
    use crate::types::{LoginRequest, RegisterRequest};
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn backend() -> Router {
        Router::new()
            .route(
                "/auth/register",
                post(|Json(body): Json<Value>| async move {
                    (
                        StatusCode::CREATED,
                        Json(json!({
                            "id": 1,
                            "username": body["username"],
                            "email": body["email"],
                            "is_active": true,
                            "created_at": "2024-05-01T08:00:00",
                        })),
                    )
                }),
            )
            .route(
                "/auth/login",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "secret" {
                        Ok(Json(json!({"access_token": "jwt-123", "token_type": "bearer"})))
                    } else {
                        Err((StatusCode::UNAUTHORIZED, Json(json!({"detail": "用户名或密码错误"}))))
                    }
                }),
            )
            .route(
                "/auth/me",
                get(|headers: HeaderMap| async move {
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some("Bearer jwt-123") => Ok(Json(json!({"id": 1, "username": "alice"}))),
                        _ => Err(StatusCode::UNAUTHORIZED),
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_register() {
        let base = spawn_backend(backend()).await;
        let recorder = Recorder::new();
        let client = recorder.client(&base, MemoryStore::new());

        let user = client
            .auth()
            .register(&RegisterRequest {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn test_login_stores_token_used_by_next_request() {
        let base = spawn_backend(backend()).await;
        let recorder = Recorder::new();
        let store = Arc::new(MemoryStore::new());
        let client = recorder.client_with(&base, store.clone());

        let token = client
            .auth()
            .login(&LoginRequest {
                username: "alice".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        assert_eq!(token.access_token, "jwt-123");
        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("jwt-123"));

        let me = client.auth().current_user().await.unwrap();
        assert_eq!(me.username, "alice");
        assert_eq!(client.auth().cached_user().unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_failed_login_redirects_without_storing() {
        let base = spawn_backend(backend()).await;
        let recorder = Recorder::new();
        let store = Arc::new(MemoryStore::new());
        let client = recorder.client_with(&base, store.clone());

        let err = client
            .auth()
            .login(&LoginRequest {
                username: "alice".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(store.is_empty());
        assert_eq!(recorder.redirects(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let recorder = Recorder::new();
        let store = Arc::new(MemoryStore::with_token("jwt-123"));
        store.set(USER_KEY, r#"{"id":1,"username":"alice"}"#).unwrap();
        let client = recorder.client_with("http://127.0.0.1:9", store.clone());

        assert!(client.auth().is_logged_in());
        client.auth().logout().unwrap();
        assert!(!client.auth().is_logged_in());
        assert!(client.auth().cached_user().is_none());
    }
}
