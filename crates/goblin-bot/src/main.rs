use std::sync::Arc;

use tracing::info;

use goblin_chat::{Asker, ChatGptClient};
use goblin_core::GoblinConfig;
use goblin_discord::DiscordAdapter;
use goblin_sessions::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "goblin_bot=info,goblin_chat=info,goblin_discord=info,serenity=warn".into()
            }),
        )
        .init();

    // load config: GOBLIN_CONFIG env > ~/.goblin/goblin.toml
    let config_path = std::env::var("GOBLIN_CONFIG").ok();
    let config = GoblinConfig::load(config_path.as_deref())?;

    let client = Arc::new(ChatGptClient::new(
        config.backend.api_token.clone(),
        Some(config.backend.base_url.clone()),
    ));
    let asker = Arc::new(Asker::new(client, config.conversation.start_prompt.clone()));
    let sessions = Arc::new(SessionStore::new());

    info!(
        backend = %config.backend.base_url,
        dm_enabled = config.discord.dm_enabled,
        priming = config.conversation.start_prompt.is_some(),
        "goblin starting"
    );

    DiscordAdapter::new(&config.discord, asker, sessions)
        .run()
        .await;

    Ok(())
}
