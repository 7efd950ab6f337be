use crate::configuration::Config;
use crate::message::Message;
use crate::traits::Deliverer;
use async_trait::async_trait;
use reqwest::Url;
use teloxide::requests::Requester;
use teloxide::types::ChatId;
use teloxide::{Bot, RequestError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to init telegram bot")]
    BotInit(#[source] RequestError),

    #[error("message not sent")]
    NotSent(#[source] RequestError),
}

/// Sends `message.text` to `chat_id` with a freshly initialized bot.
///
/// The bot is validated with `getMe` before sending, so a revoked or
/// mistyped credential surfaces as [`DeliveryError::BotInit`] rather than
/// as a failed send.
#[tracing::instrument(name = "send_to_telegram", skip_all, fields(chat_id = chat_id.0))]
pub async fn send_to_telegram(
    token: &str,
    api_url: Option<&Url>,
    chat_id: ChatId,
    message: &Message,
) -> Result<(), DeliveryError> {
    let mut bot = Bot::new(token);
    if let Some(url) = api_url {
        bot = bot.set_api_url(url.clone());
    }

    let me = bot.get_me().await.map_err(DeliveryError::BotInit)?;
    debug!("Authorized as bot {:?}", me.user.id);

    bot.send_message(chat_id, message.text.clone())
        .await
        .map_err(DeliveryError::NotSent)?;

    Ok(())
}

/// Telegram Bot API implementation of Deliverer
#[derive(Clone)]
pub struct TelegramDeliverer {
    token: String,
    chat_id: ChatId,
    api_url: Option<Url>,
}

impl TelegramDeliverer {
    pub fn new(token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            token: token.into(),
            chat_id: ChatId(chat_id),
            api_url: None,
        }
    }

    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = Some(api_url);
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let deliverer = Self::new(config.bot_token.clone(), config.chat_id);
        match &config.telegram_api_url {
            Some(url) => deliverer.with_api_url(url.clone()),
            None => deliverer,
        }
    }
}

#[async_trait]
impl Deliverer for TelegramDeliverer {
    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        send_to_telegram(&self.token, self.api_url.as_ref(), self.chat_id, message).await
    }
}
