pub mod assets;
pub mod channels;
pub mod error;
pub mod media;
pub mod reviews;
pub mod sections;
pub mod state;
pub mod text;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Storefront JSON API, mounted under `/api`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/channels", get(channels::get_channels))
        .route("/api/reviews", get(reviews::get_reviews).post(reviews::create_review))
        .route("/api/sections", get(sections::list_sections))
        .route("/api/sections/{slug}", get(sections::get_section))
        .route("/api/static", get(assets::serve_static))
        .with_state(state)
}
