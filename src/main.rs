use std::sync::Arc;

use anyhow::Context;
use telegram_relay::configuration::Config;
use telegram_relay::delivery::TelegramDeliverer;
use telegram_relay::server::{AppState, serve};
use telegram_relay::telemetry::{get_subscriber, init_subscriber};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("telegram-relay".into(), "info".into());
    init_subscriber(subscriber);

    info!("Starting telegram-relay");

    // Nothing is bound until the configuration is known to be complete.
    let config = Config::from_env()
        .inspect_err(|e| error!("Invalid configuration: {e}"))
        .context("BOT_TOKEN, BEARER_TOKEN, CHAT_ID and PORT env vars must be set")?;

    let deliverer = TelegramDeliverer::from_config(&config);
    let state = AppState::new(&config.bearer_token, Arc::new(deliverer));

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr()))?;

    serve(listener, state).await
}
