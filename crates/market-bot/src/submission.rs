use futures_util::future::join_all;
use teloxide::types::{Message, User};
use tracing::info;

use crate::client::BotApi;

/// Reply to `/start` on the submission bot: what a listing request needs.
pub const FORM_TEXT: &str = "Мы открыты к вашим предложениям. Заполните следующую форму:\n\n\
     1. ссылка на бота с миниаппом / бота\n\
     2. название\n\
     3. описание\n\
     4. лого\n\
     5. скриншоты (по возможности) размером 370x650\n\
     6. ссылка типа: https://t.me/юз_миниаппа_без_@/app?startapp\n\
     7. ваш юзернейм для связи";

pub const ACK_TEXT: &str =
    "Спасибо! Ваша заявка отправлена, мы свяжемся с вами при необходимости.";

/// Reply to `/start` on the storefront bot.
pub const STOREFRONT_TEXT: &str = "Market miniapp - некоммерческий сервис для удобства \
     пользователя в выборе и использовании встроенных миниприложений в телеграм. Сервис \
     предоставляет быстрый и легкий доступ к миниприложениям под ваши нужды.";

/// The parts of a Telegram message the bots act on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub sender: Option<Sender>,
    pub text: Option<String>,
    pub caption: Option<String>,
    /// Carries a photo or a document, which is forwarded as-is.
    pub has_media: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sender {
    pub id: u64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        Self {
            chat_id: msg.chat.id.0,
            message_id: msg.id.0,
            sender: msg.from.as_ref().map(Sender::from),
            text: msg.text().map(String::from),
            caption: msg.caption().map(String::from),
            has_media: msg.photo().is_some() || msg.document().is_some(),
        }
    }
}

/// Only the bare command opens the form; `/start <text>` is a submission
/// like any other message.
pub fn is_start_command(text: &str) -> bool {
    text == "/start"
}

/// `First Last (@username) id=42` for the moderators.
pub fn sender_label(from: Option<&Sender>) -> String {
    let Some(sender) = from else {
        return "неизвестный пользователь".to_string();
    };

    let name = [Some(sender.first_name.as_str()), sender.last_name.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let username = sender.username.as_deref().unwrap_or("нет username");

    format!("{name} (@{username}) id={}", sender.id).trim().to_string()
}

pub fn submission_text(from: Option<&Sender>, body: &str) -> String {
    format!("Новая заявка от {}:\n\n{}", sender_label(from), body)
}

/// Handles one message to the submission bot: `/start` gets the form,
/// anything else is relayed to every moderator and acknowledged.
pub async fn handle_submission<B: BotApi>(api: &B, moderators: &[i64], message: &IncomingMessage) {
    let chat_id = message.chat_id;
    let text = message.text.as_deref().unwrap_or_default();

    if is_start_command(text) {
        api.send_message(chat_id, FORM_TEXT).await;
        return;
    }

    let body = if text.is_empty() {
        message.caption.as_deref().unwrap_or_default()
    } else {
        text
    };

    if !body.is_empty() {
        let relay = submission_text(message.sender.as_ref(), body);
        join_all(moderators.iter().map(|&m| api.send_message(m, &relay))).await;
    }

    if message.has_media {
        join_all(
            moderators
                .iter()
                .map(|&m| api.forward_message(m, chat_id, message.message_id)),
        )
        .await;
    }

    info!(
        "Submission from chat {} relayed to {} moderator(s)",
        chat_id,
        moderators.len()
    );
    api.send_message(chat_id, ACK_TEXT).await;
}

/// The storefront bot only answers `/start`; everything else is ignored.
pub async fn handle_storefront<B: BotApi>(api: &B, message: &IncomingMessage) {
    let text = message.text.as_deref().map(str::trim).unwrap_or_default();
    if text == "/start" {
        api.send_message(message.chat_id, STOREFRONT_TEXT).await;
    }
}
