use std::path::PathBuf;
use std::sync::Arc;

use market_db::Database;
use tracing::error;

use crate::error::ApiError;
use crate::media::AssetUrls;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub assets: AssetUrls,
    /// Directory holding icons and screenshots served by `/api/static`.
    pub assets_dir: PathBuf,
}

/// Runs blocking DB work off the async runtime. Failures are logged and
/// masked as a generic internal error.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(|e| {
            error!("Database error: {:#}", e);
            ApiError::Internal
        })
}
