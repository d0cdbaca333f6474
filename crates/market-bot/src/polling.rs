use std::time::Duration;

use futures_util::StreamExt;
use teloxide::types::{AllowedUpdate, UpdateKind};
use teloxide::update_listeners::{AsUpdateStream, Polling, UpdateListener};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::submission::{IncomingMessage, handle_submission};
use crate::webhook::BotState;

/// How long Telegram holds a `getUpdates` call open.
const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Background task that long-polls Telegram for the submission bot until
/// `cancel` fires. Used where no public webhook URL is available. The
/// listener tracks the update offset and backs off after failed requests.
pub async fn run_polling_loop(state: BotState, cancel: CancellationToken) {
    let Some(bot) = state.bot.clone() else {
        warn!("Polling requested but TELEGRAM_BOT_TOKEN is not set; not starting");
        return;
    };

    let mut listener = Polling::builder(bot.clone())
        .timeout(LONG_POLL_TIMEOUT)
        .allowed_updates(vec![AllowedUpdate::Message])
        .delete_webhook()
        .await
        .build();
    let stop = listener.stop_token();
    let mut updates = std::pin::pin!(listener.as_stream());

    info!("Polling Telegram for submissions");

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                stop.stop();
                break;
            }
            next = updates.next() => next,
        };

        match next {
            Some(Ok(update)) => {
                if let UpdateKind::Message(msg) = &update.kind {
                    let message = IncomingMessage::from(msg);
                    handle_submission(&bot, &state.moderators, &message).await;
                }
            }
            Some(Err(e)) => warn!("Polling error: {}", e),
            None => break,
        }
    }

    info!("Polling stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::webhook::BotStateInner;

    #[tokio::test]
    async fn exits_without_token() {
        let state = Arc::new(BotStateInner {
            bot: None,
            moderators: vec![],
            webhook_secret: None,
        });
        run_polling_loop(state, CancellationToken::new()).await;
    }

    #[tokio::test]
    async fn stops_on_cancel() {
        let state = Arc::new(BotStateInner {
            bot: Some(crate::client::create_bot("http://127.0.0.1:1", "1:x").unwrap()),
            moderators: vec![],
            webhook_secret: None,
        });
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_polling_loop(state, cancel.clone()));
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(20), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
