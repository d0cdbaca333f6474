use std::path::PathBuf;

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMode {
    /// Telegram pushes updates to the webhook routes.
    Webhook,
    /// A background task pulls updates with `getUpdates`.
    Polling,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub seed_db: Option<PathBuf>,
    pub seed_file: Option<PathBuf>,
    pub assets_dir: PathBuf,
    pub asset_base_url: Option<String>,
    pub bot_token: Option<String>,
    pub telegram_api_url: String,
    pub moderator_ids: Vec<i64>,
    pub webhook_secret: Option<String>,
    pub bot_mode: BotMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("MARKET_PORT") {
            Some(p) => p
                .parse()
                .with_context(|| format!("MARKET_PORT is not a valid port: {p}"))?,
            None => 3000,
        };

        let moderator_ids = match var("MARKET_MODERATOR_IDS") {
            Some(ids) => parse_moderator_ids(&ids)?,
            None => Vec::new(),
        };

        let bot_mode = match var("MARKET_BOT_MODE").as_deref() {
            None | Some("webhook") => BotMode::Webhook,
            Some("polling") => BotMode::Polling,
            Some(other) => bail!("MARKET_BOT_MODE must be `webhook` or `polling`, got `{other}`"),
        };

        Ok(Self {
            host: var("MARKET_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: var("MARKET_DB_PATH")
                .unwrap_or_else(|| "database/telegram_channels.db".into())
                .into(),
            seed_db: var("MARKET_SEED_DB").map(PathBuf::from),
            seed_file: var("MARKET_SEED_FILE").map(PathBuf::from),
            assets_dir: var("MARKET_ASSETS_DIR")
                .unwrap_or_else(|| "database/logo&screens".into())
                .into(),
            asset_base_url: var("MARKET_ASSET_BASE_URL"),
            bot_token: var("TELEGRAM_BOT_TOKEN"),
            telegram_api_url: var("TELEGRAM_API_URL")
                .unwrap_or_else(|| "https://api.telegram.org".into()),
            moderator_ids,
            webhook_secret: var("MARKET_WEBHOOK_SECRET"),
            bot_mode,
        })
    }
}

/// `"123, 456"` → `[123, 456]`. Empty items are skipped.
fn parse_moderator_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("MARKET_MODERATOR_IDS contains a non-numeric id: {s}"))
        })
        .collect()
}
