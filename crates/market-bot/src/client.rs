use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{ClientBuilder, Url};
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::error;

/// Long enough to cover a 30 s `getUpdates` long poll.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Outbound calls the bots make. Delivery is best effort: implementations
/// log failures and never retry.
pub trait BotApi: Send + Sync {
    fn send_message(&self, chat_id: i64, text: &str) -> impl Future<Output = ()> + Send;

    fn forward_message(
        &self,
        to_chat_id: i64,
        from_chat_id: i64,
        message_id: i32,
    ) -> impl Future<Output = ()> + Send;
}

/// Creates a Bot against `api_url` (the public Bot API or a local server).
pub fn create_bot(api_url: &str, token: &str) -> Result<Bot> {
    let url = Url::parse(api_url).with_context(|| format!("invalid TELEGRAM_API_URL: {api_url}"))?;
    let client = ClientBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("building Telegram HTTP client")?;
    Ok(Bot::with_client(token, client).set_api_url(url))
}

impl BotApi for Bot {
    async fn send_message(&self, chat_id: i64, text: &str) {
        if let Err(e) = Requester::send_message(self, ChatId(chat_id), text).await {
            error!("Telegram sendMessage to {} failed: {}", chat_id, e);
        }
    }

    async fn forward_message(&self, to_chat_id: i64, from_chat_id: i64, message_id: i32) {
        let request = Requester::forward_message(
            self,
            ChatId(to_chat_id),
            ChatId(from_chat_id),
            MessageId(message_id),
        );
        if let Err(e) = request.await {
            error!("Telegram forwardMessage to {} failed: {}", to_chat_id, e);
        }
    }
}
