use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::webhook::BotState;

/// Header Telegram sets on webhook deliveries when `setWebhook` was given a
/// `secret_token`.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Rejects webhook calls that do not carry the configured secret. Without a
/// configured secret every call passes.
pub async fn require_webhook_secret(
    State(state): State<BotState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let provided = req
            .headers()
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok());

        if provided != Some(expected) {
            warn!("Webhook call to {} with missing or wrong secret", req.uri().path());
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(req).await)
}
