use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use market_db::models::ChannelFilter;
use market_types::api::SectionWithApps;
use market_types::models::{SECTIONS, Section, find_section};

use crate::channels::list_channels;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_sections() -> Json<&'static [Section]> {
    Json(SECTIONS)
}

/// GET /api/sections/{slug}: the section plus every app of its category.
pub async fn get_section(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let section = find_section(&slug).ok_or_else(|| ApiError::not_found("Раздел не найден"))?;

    let filter = ChannelFilter {
        category: Some(section.category.to_string()),
        ..Default::default()
    };
    let apps = list_channels(&state, filter).await?;

    Ok(Json(SectionWithApps {
        section: *section,
        apps,
    }))
}
