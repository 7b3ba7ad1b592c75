//! Shared types for talk-core.
//!
//! These mirror the JSON payloads exchanged with the AI Talk backend. Fields
//! the client never interprets are kept optional so that schema drift on the
//! server does not break deserialization.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Title the backend gives conversations created without one
pub const DEFAULT_CONVERSATION_TITLE: &str = "新对话";

// ─────────────────────────────────────────────────────────────────────────────
// Entity Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub message_count: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub conversation_id: Option<i64>,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Register request
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Create conversation request
#[derive(Debug, Clone, Serialize)]
pub struct CreateConversation {
    pub title: String,
}

impl Default for CreateConversation {
    fn default() -> Self {
        Self {
            title: DEFAULT_CONVERSATION_TITLE.to_string(),
        }
    }
}

/// Update conversation request
#[derive(Debug, Clone, Serialize)]
pub struct UpdateConversation {
    pub title: String,
}

/// Send message request (both the plain and the streaming endpoint)
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    pub content: String,
}

/// Reply to a non-streaming send: the stored user message and the AI answer
#[derive(Debug, Clone, Deserialize)]
pub struct MessageExchange(pub Message, pub Message);

// ─────────────────────────────────────────────────────────────────────────────
// Stream Events
// ─────────────────────────────────────────────────────────────────────────────

/// Message summary embedded in stream events
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamedMessage {
    #[serde(default)]
    pub id: Option<i64>,
    pub content: String,
    #[serde(default)]
    pub role: Option<MessageRole>,
}

/// Typed view of the records emitted by `POST .../messages/stream`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The user's message has been stored
    UserMessage { message: StreamedMessage },
    /// The assistant started answering
    AiStart,
    /// Incremental assistant output
    AiChunk { content: String },
    /// The assistant answer has been stored
    AiComplete { message: StreamedMessage },
    /// Server-side failure reported in-band
    Error { message: String },
    /// End of the exchange
    Done,
    /// Record types this client does not know about
    #[serde(other)]
    Unknown,
}

impl ChatEvent {
    /// Whether no further records are expected after this one
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Done)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timestamps
// ─────────────────────────────────────────────────────────────────────────────

/// Serde helpers for backend timestamps.
///
/// The backend emits ISO-8601 datetimes, sometimes with an offset and
/// sometimes without. Offsets are normalized to UTC and dropped.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime};

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    /// Parse a backend timestamp
    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(dt) => serializer.serialize_some(&dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            Ok(raw.as_deref().and_then(super::parse))
        }
    }
}
