use std::sync::LazyLock;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use market_types::api::StaticQuery;
use regex::Regex;
use tracing::{error, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Icons and screenshots are flat `.webp` files; anything else is refused
/// before the filesystem is touched.
static ASSET_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_.-]+\.webp$").expect("asset name regex compiles")
});

const CACHE_CONTROL: &str = "public, max-age=31536000";

/// GET /api/static?file=<name>: streams an image from the assets directory.
pub async fn serve_static(
    State(state): State<AppState>,
    Query(query): Query<StaticQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let file = query
        .file
        .filter(|f| ASSET_NAME.is_match(f))
        .ok_or_else(|| ApiError::bad_request("Неверное имя файла"))?;

    let path = state.assets_dir.join(&file);
    let resolved = match tokio::fs::canonicalize(&path).await {
        Ok(p) => p,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("Файл не найден"));
        }
        Err(e) => {
            error!("Failed to resolve {}: {}", path.display(), e);
            return Err(ApiError::Internal);
        }
    };

    // Symlinks may point anywhere; only files that really live under the
    // assets directory are served.
    let root = tokio::fs::canonicalize(&state.assets_dir).await.map_err(|e| {
        error!("Failed to resolve assets dir {}: {}", state.assets_dir.display(), e);
        ApiError::Internal
    })?;
    if !resolved.starts_with(&root) {
        warn!("Refused asset outside {}: {}", root.display(), resolved.display());
        return Err(ApiError::Forbidden("Доступ запрещён".to_string()));
    }

    let bytes = tokio::fs::read(&resolved).await.map_err(|e| {
        error!("Failed to read asset {}: {}", resolved.display(), e);
        ApiError::not_found("Файл не найден")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/webp"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        bytes,
    ))
}
