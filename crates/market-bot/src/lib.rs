pub mod client;
pub mod middleware;
pub mod polling;
pub mod submission;
pub mod webhook;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::webhook::BotState;

/// Webhook endpoints for the submission bot and the storefront bot. The
/// secret check covers the POST hooks only; the GET health check stays open.
pub fn router(state: BotState) -> Router {
    Router::new()
        .route("/api/telegram-webhook", post(webhook::submission_webhook))
        .route("/api/telegram-bot", post(webhook::storefront_webhook))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_webhook_secret,
        ))
        .route("/api/telegram-webhook", get(webhook::webhook_health))
        .with_state(state)
}
