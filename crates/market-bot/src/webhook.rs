use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde_json::{Value, json};
use teloxide::Bot;
use teloxide::types::{Update, UpdateKind};
use tracing::{debug, error};

use crate::submission::{IncomingMessage, handle_storefront, handle_submission};

pub type BotState = Arc<BotStateInner>;

pub struct BotStateInner {
    /// `None` when no bot token is configured.
    pub bot: Option<Bot>,
    /// Chats that receive submissions.
    pub moderators: Vec<i64>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`, if any.
    pub webhook_secret: Option<String>,
}

fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// The message carried by an update, if the body is one.
fn message_of(body: &[u8]) -> Option<IncomingMessage> {
    let update = match serde_json::from_slice::<Update>(body) {
        Ok(update) => update,
        Err(e) => {
            debug!("Ignoring unparsable update: {}", e);
            return None;
        }
    };
    match &update.kind {
        UpdateKind::Message(msg) => Some(IncomingMessage::from(msg)),
        _ => None,
    }
}

/// POST /api/telegram-webhook: always answers `{ ok: true }` so Telegram
/// never redelivers; failures are only logged.
pub async fn submission_webhook(State(state): State<BotState>, body: Bytes) -> Json<Value> {
    let Some(message) = message_of(&body) else {
        return ok();
    };

    match &state.bot {
        Some(bot) => handle_submission(bot, &state.moderators, &message).await,
        None => error!("TELEGRAM_BOT_TOKEN is not set; dropping message from chat {}", message.chat_id),
    }

    ok()
}

/// GET /api/telegram-webhook
pub async fn webhook_health() -> Json<Value> {
    ok()
}

/// POST /api/telegram-bot: the storefront bot's `/start` greeting.
pub async fn storefront_webhook(
    State(state): State<BotState>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let Some(bot) = &state.bot else {
        error!("TELEGRAM_BOT_TOKEN is not set");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "ok": false })));
    };

    if serde_json::from_slice::<Value>(&body).is_err() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "ok": false })));
    }

    // Well-formed JSON that is not a message update is acknowledged and ignored.
    if let Some(message) = message_of(&body) {
        handle_storefront(bot, &message).await;
    }

    (StatusCode::OK, ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::middleware::SECRET_HEADER;

    fn state(bot: Option<Bot>, secret: Option<&str>) -> BotState {
        Arc::new(BotStateInner {
            bot,
            moderators: vec![1001, 1002],
            webhook_secret: secret.map(String::from),
        })
    }

    /// Points at a closed local port so every outbound call fails fast.
    fn dead_bot() -> Bot {
        crate::client::create_bot("http://127.0.0.1:1", "123:abc").unwrap()
    }

    async fn post(
        state: BotState,
        uri: &str,
        body: &str,
        secret: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut req = Request::post(uri).header("content-type", "application/json");
        if let Some(secret) = secret {
            req = req.header(SECRET_HEADER, secret);
        }
        let req = req.body(Body::from(body.to_string())).unwrap();
        let resp = crate::router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        // Rejections from the secret check carry no body.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    const START_UPDATE: &str = r#"{"update_id": 1, "message": {"message_id": 5, "date": 1700000000,
        "chat": {"id": 42, "type": "private", "first_name": "Ivan"}, "text": "/start"}}"#;

    #[tokio::test]
    async fn submission_hook_tolerates_garbage() {
        let (status, body) = post(state(None, None), "/api/telegram-webhook", "{{{", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);

        let (status, _) =
            post(state(None, None), "/api/telegram-webhook", r#"{"update_id": 3}"#, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn submission_hook_survives_telegram_outage() {
        let (status, body) = post(
            state(Some(dead_bot()), None),
            "/api/telegram-webhook",
            r#"{"update_id": 2, "message": {"message_id": 6, "date": 1700000000,
                "chat": {"id": 42, "type": "private", "first_name": "Ivan"},
                "from": {"id": 42, "is_bot": false, "first_name": "Ivan"}, "text": "my app"}}"#,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn health_check_answers_ok() {
        let req = Request::get("/api/telegram-webhook").body(Body::empty()).unwrap();
        let resp = crate::router(state(None, Some("s3cret"))).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn storefront_hook_needs_token() {
        let (status, body) = post(state(None, None), "/api/telegram-bot", START_UPDATE, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn storefront_hook_rejects_non_json() {
        let (status, body) =
            post(state(Some(dead_bot()), None), "/api/telegram-bot", "nope", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);

        let (status, _) =
            post(state(Some(dead_bot()), None), "/api/telegram-bot", "{}", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn secret_header_is_enforced() {
        let s = || state(Some(dead_bot()), Some("s3cret"));

        let req = Request::post("/api/telegram-webhook")
            .body(Body::from(START_UPDATE))
            .unwrap();
        let resp = crate::router(s()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let (status, body) =
            post(s(), "/api/telegram-webhook", START_UPDATE, Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, Value::Null);

        let (status, _) = post(s(), "/api/telegram-bot", START_UPDATE, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            post(s(), "/api/telegram-webhook", START_UPDATE, Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }
}
