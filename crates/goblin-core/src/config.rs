use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (goblin.toml + GOBLIN_* env overrides).
///
/// Env vars use `__` as the section separator so snake_case keys survive,
/// e.g. `GOBLIN_DISCORD__BOT_TOKEN` → `discord.bot_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoblinConfig {
    pub discord: DiscordConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// When true, direct messages are answered.
    /// Defaults to true.
    #[serde(default = "bool_true")]
    pub dm_enabled: bool,
}

/// Chat-completion backend endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub api_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConversationConfig {
    /// Priming prompt sent once per fresh session, before the user's first
    /// question. Absent disables priming entirely.
    pub start_prompt: Option<String>,
}

fn bool_true() -> bool {
    true
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

impl GoblinConfig {
    /// Load config from a TOML file with GOBLIN_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.goblin/goblin.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: GoblinConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("GOBLIN_").split("__"))
            .extract()
            .map_err(|e| crate::error::GoblinError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.goblin/goblin.toml", home)
}
