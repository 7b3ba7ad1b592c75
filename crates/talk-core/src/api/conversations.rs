//! Conversation endpoints.

use super::Page;
use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{Conversation, CreateConversation, UpdateConversation};

/// `/conversations` endpoints
pub struct ConversationApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ConversationApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List conversations, most recently updated first
    pub async fn list(&self, page: Page) -> Result<Vec<Conversation>> {
        self.client.get("/conversations", &page.query()).await
    }

    /// Create a conversation
    pub async fn create(&self, req: &CreateConversation) -> Result<Conversation> {
        self.client.post("/conversations", req).await
    }

    /// Get a conversation by ID
    pub async fn get(&self, id: i64) -> Result<Conversation> {
        self.client.get(&format!("/conversations/{}", id), &[]).await
    }

    /// Rename a conversation
    pub async fn update(&self, id: i64, req: &UpdateConversation) -> Result<Conversation> {
        self.client.put(&format!("/conversations/{}", id), req).await
    }

    /// Delete a conversation and its messages
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/conversations/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::Page;
    use crate::auth::MemoryStore;
    use crate::testing::{spawn_backend, Recorder};
    use crate::types::{CreateConversation, UpdateConversation};
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn conversation(id: i64, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "user_id": 1,
            "created_at": "2024-05-01T08:00:00",
            "updated_at": "2024-05-01T08:00:00",
            "message_count": 0,
        })
    }

    fn backend() -> Router {
        Router::new()
            .route(
                "/conversations",
                get(|Query(q): Query<HashMap<String, u64>>| async move {
                    // Echo the pagination back through the titles
                    Json(json!([
                        conversation(q["skip"] as i64, "skip"),
                        conversation(q["limit"] as i64, "limit"),
                    ]))
                })
                .post(|Json(body): Json<Value>| async move {
                    let title = body["title"].as_str().unwrap_or_default().to_string();
                    (StatusCode::CREATED, Json(conversation(10, &title)))
                }),
            )
            .route(
                "/conversations/{id}",
                get(|Path(id): Path<i64>| async move {
                    if id == 404 {
                        Err((StatusCode::NOT_FOUND, Json(json!({"detail": "对话不存在"}))))
                    } else {
                        Ok(Json(conversation(id, "existing")))
                    }
                })
                .put(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                    Json(conversation(id, body["title"].as_str().unwrap_or_default()))
                })
                .delete(|| async { StatusCode::NO_CONTENT }),
            )
    }

    #[tokio::test]
    async fn test_list_sends_skip_and_limit() {
        let base = spawn_backend(backend()).await;
        let client = Recorder::new().client(&base, MemoryStore::with_token("t"));

        let list = client.conversations().list(Page::new(3, 20)).await.unwrap();
        assert_eq!(list[0].id, 40);
        assert_eq!(list[1].id, 20);
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let base = spawn_backend(backend()).await;
        let client = Recorder::new().client(&base, MemoryStore::with_token("t"));
        let api = client.conversations();

        let created = api.create(&CreateConversation::default()).await.unwrap();
        assert_eq!(created.title, "新对话");

        let fetched = api.get(7).await.unwrap();
        assert_eq!(fetched.id, 7);

        let renamed = api
            .update(7, &UpdateConversation { title: "Rust".into() })
            .await
            .unwrap();
        assert_eq!(renamed.title, "Rust");

        api.delete(7).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_conversation_notifies_detail() {
        let base = spawn_backend(backend()).await;
        let recorder = Recorder::new();
        let client = recorder.client(&base, MemoryStore::with_token("t"));

        let err = client.conversations().get(404).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(recorder.messages(), vec!["对话不存在"]);
    }
}
