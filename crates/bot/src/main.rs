use std::sync::Arc;

use anyhow::Context;

use teahouse_bot::controller::DialogueController;
use teahouse_bot::telegram::{self, TelegramGateway};
use teahouse_bot::BotConfig;
use teahouse_store::{AppState, JsonFileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    teahouse_observability::init();

    let config = BotConfig::from_env()?;

    let store = Arc::new(JsonFileStore::new(&config.state_path));
    let state = Arc::new(
        AppState::load(store)
            .await
            .context("failed to load the state document")?,
    );

    let gateway = Arc::new(TelegramGateway::new(&config.token));
    let controller = DialogueController::new(state, gateway.clone(), config);

    tracing::info!("teahouse bot is running");
    telegram::run_polling(gateway, controller).await
}
