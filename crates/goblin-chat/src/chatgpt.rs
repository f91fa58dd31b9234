//! HTTP client for the ChatGPT relay backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{ChatClient, ChatCursor, ChatError, ChatReply};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Talks to a ChatGPT relay over its JSON conversation endpoint.
pub struct ChatGptClient {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
}

impl ChatGptClient {
    pub fn new(api_token: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl ChatClient for ChatGptClient {
    fn name(&self) -> &str {
        "chatgpt"
    }

    async fn send_message(
        &self,
        text: &str,
        cursor: &ChatCursor,
    ) -> Result<ChatReply, ChatError> {
        let url = format!("{}/conversation", self.base_url);
        debug!(chained = cursor.conversation_id.is_some(), "sending message to backend");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&ConversationRequest {
                message: text,
                conversation_id: cursor.conversation_id.as_deref(),
                parent_message_id: cursor.parent_message_id.as_deref(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %message, "backend rejected request");
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ConversationResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        Ok(ChatReply {
            text: reply.response,
            conversation_id: reply.conversation_id,
            message_id: reply.message_id,
        })
    }
}

// Wire types. The relay identifies threads with camelCase keys; absent
// identifiers are omitted entirely so it opens a fresh thread.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_message_id: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationResponse {
    response: String,
    conversation_id: String,
    message_id: String,
}
