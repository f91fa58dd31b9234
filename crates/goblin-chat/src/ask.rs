//! Ask orchestration, shared by the direct-message and slash-command flows.
//!
//! [`Asker::ask`] drives one full turn: an optional priming exchange for a
//! fresh session, then the real question chained onto the session
//! identifiers, each raced against a timeout window. The future resolves
//! exactly once; an expired window drops the in-flight backend call, so a
//! late reply has nowhere to land.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use goblin_sessions::SessionHandle;

use crate::client::{ChatClient, ChatCursor, ChatError, ChatReply};

/// Window for a question sent without a prior priming exchange. Also covers
/// the priming call itself.
pub const ASK_TIMEOUT: Duration = Duration::from_secs(120);

/// Window for the real question once priming has already warmed the thread.
pub const PRIMED_ASK_TIMEOUT: Duration = Duration::from_secs(45);

/// Fixed reply when the backend does not answer within the window.
pub const TIMEOUT_MESSAGE: &str = "Oops, something went wrong! (Timeout)";

/// Fixed reply when the backend call fails. The cause is logged, never shown.
pub const ERROR_MESSAGE: &str = "Oops, something went wrong! (Error)";

#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("backend call failed: {0}")]
    Backend(#[from] ChatError),
}

impl AskError {
    /// The fixed user-visible text for this failure. Raw error detail stays
    /// in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            AskError::Timeout(_) => TIMEOUT_MESSAGE,
            AskError::Backend(_) => ERROR_MESSAGE,
        }
    }
}

/// Drives question turns against the chat backend.
pub struct Asker {
    client: Arc<dyn ChatClient>,
    start_prompt: Option<String>,
}

impl Asker {
    pub fn new(client: Arc<dyn ChatClient>, start_prompt: Option<String>) -> Self {
        Self {
            client,
            start_prompt,
        }
    }

    /// Ask one question and resolve to the answer text, or to a typed error
    /// whose [`AskError::user_message`] is safe to show in chat.
    ///
    /// With a session the turn is single-flight: the session lock is held
    /// until the exchange lands, so a second ask from the same user queues
    /// behind this one and chains onto its result. Without a session the
    /// question goes out unchained and nothing is primed or recorded.
    pub async fn ask(
        &self,
        question: &str,
        session: Option<&SessionHandle>,
    ) -> Result<String, AskError> {
        let Some(handle) = session else {
            let reply = self
                .send_within(ASK_TIMEOUT, question, &ChatCursor::default())
                .await?;
            return Ok(reply.text);
        };

        let mut session = handle.lock().await;
        let mut window = ASK_TIMEOUT;

        // A fresh thread is primed first; the real question only goes out
        // once the priming exchange has fully resolved.
        if session.is_new {
            if let Some(prompt) = self.start_prompt.as_deref() {
                debug!(user = %session.user_id, "priming new conversation");
                let primed = self
                    .send_within(window, prompt, &ChatCursor::from(&*session))
                    .await?;
                session.record_exchange(primed.conversation_id, primed.message_id);
                window = PRIMED_ASK_TIMEOUT;
            }
        }

        let ChatReply {
            text,
            conversation_id,
            message_id,
        } = self
            .send_within(window, question, &ChatCursor::from(&*session))
            .await?;
        session.record_exchange(conversation_id, message_id);

        info!(
            user = %session.user_id,
            provider = self.client.name(),
            chars = text.chars().count(),
            "chat turn complete"
        );
        Ok(text)
    }

    /// Race one backend call against `window`. The expired branch drops the
    /// call, which is the only cancellation this flow needs.
    async fn send_within(
        &self,
        window: Duration,
        text: &str,
        cursor: &ChatCursor,
    ) -> Result<ChatReply, AskError> {
        match tokio::time::timeout(window, self.client.send_message(text, cursor)).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => Err(AskError::Backend(e)),
            Err(_) => Err(AskError::Timeout(window)),
        }
    }
}
