use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use market_db::models::{ChannelFilter, ChannelRow};
use market_db::rating::RatingTotals;
use market_types::api::{ChannelQuery, ChannelResponse};
use market_types::models::DEFAULT_CATEGORY;

use crate::error::ApiError;
use crate::media::AssetUrls;
use crate::state::{AppState, with_db};
use crate::text::truncate_to_two_lines;

const PREVIEW_FIRST_LINE: usize = 42;
const PREVIEW_TOTAL: usize = 92;

/// GET /api/channels: one entry by `id`, or the catalog narrowed by
/// `search` and `category`.
pub async fn get_channels(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> Result<Response, ApiError> {
    if let Some(id) = non_empty(query.id) {
        let channel = find_channel(&state, id).await?;
        return Ok(Json(channel).into_response());
    }

    let filter = ChannelFilter {
        search: non_empty(query.search),
        category: non_empty(query.category),
    };
    let channels = list_channels(&state, filter).await?;
    Ok(Json(channels).into_response())
}

pub(crate) async fn find_channel(state: &AppState, id: String) -> Result<ChannelResponse, ApiError> {
    let (row, totals) = with_db(state, move |db| {
        let row = db.get_channel(&id)?;
        let totals = match &row {
            Some(_) => db.rating_totals_for(&id)?,
            None => RatingTotals::default(),
        };
        Ok((row, totals))
    })
    .await?;

    let row = row.ok_or_else(|| ApiError::not_found("Канал не найден"))?;
    Ok(to_response(row, totals, &state.assets))
}

pub(crate) async fn list_channels(
    state: &AppState,
    filter: ChannelFilter,
) -> Result<Vec<ChannelResponse>, ApiError> {
    let (rows, totals) = with_db(state, move |db| {
        let rows = db.list_channels(&filter)?;
        let totals = db.rating_totals()?;
        Ok((rows, totals))
    })
    .await?;

    Ok(to_responses(rows, &totals, &state.assets))
}

fn to_responses(
    rows: Vec<ChannelRow>,
    totals: &HashMap<String, RatingTotals>,
    assets: &AssetUrls,
) -> Vec<ChannelResponse> {
    rows.into_iter()
        .map(|row| {
            let t = totals.get(&row.idminiapp).copied().unwrap_or_default();
            to_response(row, t, assets)
        })
        .collect()
}

/// The rating always comes from the reviews, never from the cached column.
fn to_response(row: ChannelRow, totals: RatingTotals, assets: &AssetUrls) -> ChannelResponse {
    let description = row.description.unwrap_or_default();
    let short_description = row
        .short_description
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let blurb = short_description.as_deref().unwrap_or(&description);
    let preview = truncate_to_two_lines(blurb, PREVIEW_FIRST_LINE, PREVIEW_TOTAL);

    ChannelResponse {
        icon: assets.icon_url(row.icon.as_deref()),
        screenshots: assets.screenshot_urls(row.screenshots_path.as_deref()),
        category: row
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        id: row.idminiapp,
        name: row.title,
        url: row.url.unwrap_or_default(),
        rating: totals.average(),
        is_verified: row.is_verified,
        preview,
        description,
        short_description,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
