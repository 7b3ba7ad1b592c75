//! Resource request builders.
//!
//! Thin, stateless views over [`ApiClient`](crate::client::ApiClient), one per
//! backend resource. Each builds a path and forwards to the client.

mod auth;
mod conversations;
mod messages;
mod pagination;

pub use auth::AuthApi;
pub use conversations::ConversationApi;
pub use messages::MessageApi;
pub use pagination::{Page, CONVERSATIONS_PAGE_SIZE, MESSAGES_PAGE_SIZE};
