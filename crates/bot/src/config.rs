use std::path::PathBuf;

use anyhow::Context;

use teahouse_core::ChatId;

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot API token (`BOT_TOKEN`).
    pub token: String,
    /// The one administrator identity (`ADMIN_CHAT_ID`).
    pub admin_chat: ChatId,
    /// Where the state document lives (`TEAHOUSE_DB`).
    pub state_path: PathBuf,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let token = std::env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?;

        let admin_chat = std::env::var("ADMIN_CHAT_ID")
            .context("ADMIN_CHAT_ID must be set")?
            .parse::<i64>()
            .context("ADMIN_CHAT_ID must be a numeric chat id")?;

        let state_path = std::env::var("TEAHOUSE_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                tracing::warn!("TEAHOUSE_DB not set; using data/teahouse.json");
                PathBuf::from("data/teahouse.json")
            });

        Ok(Self {
            token,
            admin_chat: ChatId(admin_chat),
            state_path,
        })
    }

    /// Whether this sender is the configured administrator.
    pub fn is_admin(&self, chat: ChatId) -> bool {
        chat == self.admin_chat
    }
}
