//! The `/ask` slash command.
//!
//! Registration happens in `ready()`; interactions are dispatched from
//! `interaction_create` in the event handler.

use std::sync::Arc;

use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::prelude::Context;
use tracing::{info, warn};

use goblin_chat::Asker;
use goblin_sessions::SessionStore;

use crate::embed::AnswerEmbed;
use crate::handler::RESET_MESSAGE;

/// Register the global slash commands. Called from `ready()`.
pub async fn register_commands(ctx: &Context) {
    let commands = vec![CreateCommand::new("ask")
        .description("Ask the goblin anything")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "question", "Your question")
                .required(true),
        )];

    match serenity::model::application::Command::set_global_commands(&ctx.http, commands).await {
        Ok(cmds) => info!(count = cmds.len(), "registered global slash commands"),
        Err(e) => warn!(error = %e, "failed to register global slash commands"),
    }
}

/// Dispatch a slash command interaction.
pub async fn handle_interaction(
    ctx: &Context,
    command: &CommandInteraction,
    asker: &Arc<Asker>,
    sessions: &Arc<SessionStore>,
) {
    let result = match command.data.name.as_str() {
        "ask" => handle_ask(ctx, command, asker, sessions).await,
        _ => Ok(()),
    };

    if let Err(e) = result {
        warn!(command = %command.data.name, error = %e, "slash command error");
    }
}

/// `/ask question:String`: one question in, one answer embed out.
async fn handle_ask(
    ctx: &Context,
    command: &CommandInteraction,
    asker: &Arc<Asker>,
    sessions: &Arc<SessionStore>,
) -> Result<(), serenity::Error> {
    let question = command
        .data
        .options
        .iter()
        .find(|o| o.name == "question")
        .and_then(|o| o.value.as_str())
        .unwrap_or("");

    if question.is_empty() {
        respond_ephemeral(ctx, command, "Please provide a question.").await;
        return Ok(());
    }

    let user_id = command.user.id.to_string();

    // "reset" clears the session instead of reaching the backend.
    if question.eq_ignore_ascii_case("reset") {
        sessions.reset(&user_id).await;
        let embed = AnswerEmbed::build(&command.user.name, question, RESET_MESSAGE);
        command
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new().embed(embed.to_create_embed()),
                ),
            )
            .await?;
        return Ok(());
    }

    // Defer while the backend works; Discord shows the thinking state.
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
        )
        .await?;

    let session = sessions.get(&user_id);
    let answer = match asker.ask(question, Some(&session)).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, %user_id, "slash command turn failed");
            e.user_message().to_string()
        }
    };

    let embed = AnswerEmbed::build(&command.user.name, question, &answer);
    command
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new().embed(embed.to_create_embed()),
        )
        .await?;

    Ok(())
}

/// Reply ephemerally (only visible to the invoker).
async fn respond_ephemeral(ctx: &Context, command: &CommandInteraction, content: &str) {
    let _ = command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await;
}
