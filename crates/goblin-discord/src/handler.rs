use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::EditMessage;
use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::{Context, EventHandler};
use tracing::{info, warn};

use goblin_chat::Asker;
use goblin_core::config::DiscordConfig;
use goblin_sessions::SessionStore;

use crate::error::DiscordError;
use crate::send;

/// Holding message shown while the backend works on a direct message.
pub const THINKING_MESSAGE: &str = "Hmm, let me think...";

/// Confirmation for the "reset" command.
pub const RESET_MESSAGE: &str = "Who are you again? Conversation reset.";

/// Serenity event handler wired to the ask orchestrator.
pub struct DiscordHandler {
    pub asker: Arc<Asker>,
    pub sessions: Arc<SessionStore>,
    pub config: DiscordConfig,
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(name = %ready.user.name, "Discord bot connected");
        crate::commands::register_commands(&ctx).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        // Guild chatter is out of scope; questions arrive as DMs or /ask.
        if msg.guild_id.is_some() {
            return;
        }
        if !self.config.dm_enabled {
            return;
        }

        info!(
            user_id = %msg.author.id,
            user = %msg.author.name,
            content = %msg.content,
            "direct message received"
        );

        let user_id = msg.author.id;

        if msg.content.eq_ignore_ascii_case("reset") {
            self.sessions.reset(&user_id.to_string()).await;
            if let Err(e) = msg.channel_id.say(&ctx.http, RESET_MESSAGE).await {
                warn!(error = %e, %user_id, "failed to confirm reset");
            }
            return;
        }

        // The holding message is sent before the backend is involved, then
        // either edited in place or left standing above the chunked answer.
        let mut placeholder = match msg.channel_id.say(&ctx.http, THINKING_MESSAGE).await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, %user_id, "failed to send holding message");
                return;
            }
        };

        let asker = Arc::clone(&self.asker);
        let session = self.sessions.get(&user_id.to_string());
        let http = Arc::clone(&ctx.http);
        let channel_id = msg.channel_id;
        let question = msg.content.clone();

        tokio::spawn(async move {
            let text = match asker.ask(&question, Some(&session)).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, %user_id, "direct message turn failed");
                    e.user_message().to_string()
                }
            };

            // Short answers replace the holding message in place; anything
            // at the chunk limit or beyond goes out as separate messages.
            let delivery = if text.chars().count() >= send::CHUNK_MAX {
                send::send_chunked(&http, channel_id, &text).await
            } else {
                placeholder
                    .edit(&http, EditMessage::new().content(text))
                    .await
                    .map_err(DiscordError::from)
            };

            if let Err(e) = delivery {
                warn!(error = %e, %user_id, "direct message delivery failed");
            }
        });
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            crate::commands::handle_interaction(&ctx, &command, &self.asker, &self.sessions)
                .await;
        }
    }
}
