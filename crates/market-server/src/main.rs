mod config;
mod seed;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use market_api::media::AssetUrls;
use market_api::state::{AppState, AppStateInner};
use market_bot::client::create_bot;
use market_bot::polling::run_polling_loop;
use market_bot::webhook::{BotState, BotStateInner};

use crate::config::{BotMode, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = market_db::Database::open_with_seed(&config.db_path, config.seed_db.as_deref())?;
    if let Some(seed_file) = &config.seed_file {
        seed::import_file(&db, seed_file)?;
    }

    let assets = AssetUrls::from_base(config.asset_base_url.as_deref());
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        assets,
        assets_dir: config.assets_dir.clone(),
    });

    let bot = match &config.bot_token {
        Some(token) => Some(create_bot(&config.telegram_api_url, token)?),
        None => {
            warn!("TELEGRAM_BOT_TOKEN is not set; bot routes will not reach Telegram");
            None
        }
    };
    if config.moderator_ids.is_empty() {
        warn!("MARKET_MODERATOR_IDS is empty; submissions will only be acknowledged");
    }
    let bot_state: BotState = Arc::new(BotStateInner {
        bot,
        moderators: config.moderator_ids.clone(),
        webhook_secret: config.webhook_secret.clone(),
    });

    let shutdown = CancellationToken::new();
    let poller = (config.bot_mode == BotMode::Polling)
        .then(|| tokio::spawn(run_polling_loop(bot_state.clone(), shutdown.clone())));

    let app = build_app(app_state, bot_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Market server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            token.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Some(poller) = poller {
        poller.await.ok();
    }

    Ok(())
}

fn build_app(app_state: AppState, bot_state: BotState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(market_api::router(app_state))
        .merge(market_bot::router(bot_state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
