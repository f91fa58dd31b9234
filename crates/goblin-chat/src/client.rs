//! Backend client abstraction.
//!
//! The bot only ever talks to the conversational backend through
//! [`ChatClient`], so the HTTP implementation can be swapped for a scripted
//! fake in tests.

use async_trait::async_trait;

use goblin_sessions::Session;

/// Continuation identifiers chaining a request onto an existing backend
/// thread. An empty cursor asks the backend to start a fresh thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatCursor {
    pub conversation_id: Option<String>,
    pub parent_message_id: Option<String>,
}

impl From<&Session> for ChatCursor {
    fn from(session: &Session) -> Self {
        Self {
            conversation_id: session.conversation_id.clone(),
            parent_message_id: session.parent_message_id.clone(),
        }
    }
}

/// One completed exchange: the answer text plus the identifiers that chain
/// the next turn onto this one.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub conversation_id: String,
    pub message_id: String,
}

/// A conversational AI backend.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Short client name, used in logs.
    fn name(&self) -> &str;

    /// Send one message and wait for the complete reply.
    async fn send_message(&self, text: &str, cursor: &ChatCursor)
        -> Result<ChatReply, ChatError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed backend reply: {0}")]
    Parse(String),
}
