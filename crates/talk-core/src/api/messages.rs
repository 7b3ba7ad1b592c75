//! Message endpoints of a single conversation.

use super::Page;
use crate::client::ApiClient;
use crate::error::Result;
use crate::stream::{self, EventStream};
use crate::types::{Message, MessageExchange, SendMessage};
use serde::de::DeserializeOwned;

/// `/conversations/{id}/messages` endpoints
pub struct MessageApi<'a> {
    client: &'a ApiClient,
    conversation_id: i64,
}

impl<'a> MessageApi<'a> {
    pub(crate) fn new(client: &'a ApiClient, conversation_id: i64) -> Self {
        Self {
            client,
            conversation_id,
        }
    }

    fn path(&self) -> String {
        format!("/conversations/{}/messages", self.conversation_id)
    }

    /// List messages in chronological order
    pub async fn list(&self, page: Page) -> Result<Vec<Message>> {
        self.client.get(&self.path(), &page.query()).await
    }

    /// Send a message and wait for the complete AI reply
    pub async fn send(&self, req: &SendMessage) -> Result<MessageExchange> {
        self.client.post(&self.path(), req).await
    }

    /// Send a message and stream the reply as it is generated.
    ///
    /// Each call issues a new request. Records that fail to parse as `T` are
    /// logged and skipped. Drop the stream to abandon the request.
    pub async fn stream<T>(&self, req: &SendMessage) -> Result<EventStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = format!("{}/stream", self.path());
        self.client.open_stream(&path, req).await
    }

    /// Callback form of [`stream`](Self::stream): resolves once the stream
    /// ends, rejects on transport failure.
    pub async fn send_stream<T, F>(&self, req: &SendMessage, on_event: F) -> Result<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(T),
    {
        let events = self.stream(req).await?;
        stream::for_each_event(events, on_event).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::Page;
    use crate::auth::MemoryStore;
    use crate::error::Error;
    use crate::testing::{spawn_backend, Recorder};
    use crate::types::{ChatEvent, MessageRole, SendMessage};
    use axum::{
        body::Body,
        extract::{Path, Query},
        http::{header, HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn stream_response(parts: Vec<&'static str>) -> Response {
        let chunks = futures::stream::iter(
            parts
                .into_iter()
                .map(|p| Ok::<_, std::io::Error>(bytes::Bytes::from_static(p.as_bytes()))),
        );
        Response::builder()
            .header(header::CONTENT_TYPE, "text/event-stream; charset=utf-8")
            .body(Body::from_stream(chunks))
            .unwrap()
    }

    fn backend() -> Router {
        Router::new()
            .route(
                "/conversations/{id}/messages",
                get(|Path(id): Path<i64>, Query(q): Query<HashMap<String, u64>>| async move {
                    Json(json!([{
                        "id": q["skip"],
                        "conversation_id": id,
                        "role": "user",
                        "content": format!("limit={}", q["limit"]),
                        "created_at": "2024-05-01T08:00:00",
                    }]))
                })
                .post(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                    (
                        StatusCode::CREATED,
                        Json(json!([
                            {"id": 1, "conversation_id": id, "role": "user", "content": body["content"]},
                            {"id": 2, "conversation_id": id, "role": "assistant", "content": "你好！"},
                        ])),
                    )
                }),
            )
            .route(
                "/conversations/{id}/messages/stream",
                post(|Path(id): Path<i64>, headers: HeaderMap| async move {
                    let authorized = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        == Some("Bearer t");
                    let json_body = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        == Some("application/json");
                    if !authorized || !json_body {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    if id == 500 {
                        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    }
                    stream_response(vec![
                        "data: {\"type\":\"user_message\",\"message\":{\"id\":1,\"content\":\"hi\",\"role\":\"user\"}}\n\n",
                        "data: {\"type\":\"ai_start\"}\n\ndata: {\"type\":\"ai_chunk\",\"content\":\"Hel",
                        "lo\"}\n\ndata: {broken\n\n",
                        "data: {\"type\":\"ai_chunk\",\"content\":\"!\"}\n\ndata: {\"type\":\"done\"}\n\n",
                    ])
                }),
            )
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let base = spawn_backend(backend()).await;
        let client = Recorder::new().client(&base, MemoryStore::with_token("t"));

        let messages = client.messages(3).list(Page::new(2, 50)).await.unwrap();
        assert_eq!(messages[0].id, 50);
        assert_eq!(messages[0].conversation_id, Some(3));
        assert_eq!(messages[0].content, "limit=50");
    }

    #[tokio::test]
    async fn test_send_returns_exchange() {
        let base = spawn_backend(backend()).await;
        let client = Recorder::new().client(&base, MemoryStore::with_token("t"));

        let exchange = client
            .messages(3)
            .send(&SendMessage { content: "hi".into() })
            .await
            .unwrap();
        assert_eq!(exchange.0.content, "hi");
        assert_eq!(exchange.1.role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_stream_typed_events_in_order() {
        let base = spawn_backend(backend()).await;
        let client = Recorder::new().client(&base, MemoryStore::with_token("t"));

        let events: Vec<ChatEvent> = client
            .messages(3)
            .stream(&SendMessage { content: "hi".into() })
            .await
            .unwrap()
            .map(|e| e.unwrap())
            .collect()
            .await;

        assert_eq!(events.len(), 5);
        assert!(matches!(&events[0], ChatEvent::UserMessage { message } if message.content == "hi"));
        assert_eq!(events[1], ChatEvent::AiStart);
        // Split across two reads, delivered once
        assert_eq!(events[2], ChatEvent::AiChunk { content: "Hello".into() });
        assert_eq!(events[3], ChatEvent::AiChunk { content: "!".into() });
        assert_eq!(events[4], ChatEvent::Done);
    }

    #[tokio::test]
    async fn test_send_stream_callback() {
        let base = spawn_backend(backend()).await;
        let client = Recorder::new().client(&base, MemoryStore::with_token("t"));

        let mut types = Vec::new();
        client
            .messages(3)
            .send_stream(&SendMessage { content: "hi".into() }, |event: Value| {
                types.push(event["type"].as_str().unwrap_or_default().to_string());
            })
            .await
            .unwrap();

        assert_eq!(types, vec!["user_message", "ai_start", "ai_chunk", "ai_chunk", "done"]);
    }

    #[tokio::test]
    async fn test_stream_failure_status_rejects_without_side_effects() {
        let base = spawn_backend(backend()).await;
        let recorder = Recorder::new();
        let client = recorder.client(&base, MemoryStore::with_token("t"));

        let err = client
            .messages(500)
            .send_stream(&SendMessage { content: "hi".into() }, |_: Value| {})
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Status(500)));
        assert!(recorder.messages().is_empty());
        assert!(recorder.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_stream_unauthorized_keeps_token() {
        let base = spawn_backend(backend()).await;
        let recorder = Recorder::new();
        let client = recorder.client(&base, MemoryStore::with_token("other"));

        let err = client
            .messages(3)
            .stream::<Value>(&SendMessage { content: "hi".into() })
            .await
            .err()
            .unwrap();

        assert!(matches!(err, Error::Status(401)));
        assert!(client.auth().is_logged_in());
    }
}
