use std::sync::Arc;

use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;

use expense_tracker_bot::bot::{self, AppState};
use expense_tracker_bot::cache::RedisCache;
use expense_tracker_bot::config::AppConfig;
use expense_tracker_bot::db::Database;
use expense_tracker_bot::{telemetry, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("💸 Starting expense tracker bot...");
    if dotenv.is_err() {
        tracing::info!("No .env file, using process environment");
    }

    // Load config
    let config = AppConfig::from_env()?;
    tracing::info!("Config loaded. Web port: {}", config.web_port);

    // Initialize database
    let db = Database::connect(&config.database_url).await?;
    db.run_migrations().await?;
    tracing::info!("Database connected and migrations applied.");

    // Initialize cache
    let cache = RedisCache::connect(&config.redis_url).await?;
    tracing::info!("Redis connected.");

    let metrics = telemetry::install_recorder()?;

    let store = Arc::new(db);
    let state = Arc::new(AppState::new(store.clone(), Arc::new(cache)));

    // Stats page and metrics run beside the bot
    let web_state = web::WebState {
        store,
        metrics: Some(metrics),
    };
    let listener = web::bind(config.web_port).await?;
    tokio::spawn(async move {
        if let Err(e) = web::serve(listener, web_state).await {
            tracing::error!("Web server stopped: {}", e);
        }
    });

    // Create the Telegram bot
    let bot = Bot::new(&config.telegram_token);

    // Build the dispatcher
    let handler = bot::build_handler();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        // No per-chat ordering: every update runs as its own task.
        .distribution_function(|_| None::<()>)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
