//! # Shopfront Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, starts
//! the background services (reload poller, post scheduler, backups, health
//! server), and runs the Telegram bot.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront_bot::bot::dispatcher::{Ctx, UpdateDispatcher};
use shopfront_bot::bot::messenger::{Messenger, TelegramMessenger};
use shopfront_bot::bot::state::StateStore;
use shopfront_bot::bot::BotHandler;
use shopfront_bot::config::Config;
use shopfront_bot::database::connection::DatabaseManager;
use shopfront_bot::database::models::User;
use shopfront_bot::services::backup::BackupService;
use shopfront_bot::services::cache::CatalogCache;
use shopfront_bot::services::health::HealthService;
use shopfront_bot::services::metrics::Metrics;
use shopfront_bot::services::notify::AdminNotifier;
use shopfront_bot::services::posts::PostScheduler;
use shopfront_bot::services::signal::FileSignaler;
use shopfront_bot::services::sync::ReloadService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfront_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Shopfront Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}",
        config.database_url, config.http_port
    );

    // Initialize database
    info!("Initializing database connection...");
    let db = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db.run_migrations().await?;
    let db_arc = Arc::new(db.clone());
    info!("Database initialized successfully");

    // Seed the configured admin
    if let Some(admin_id) = config.admin_telegram_id {
        User::ensure_admin(&db.pool, admin_id, &config.admin_name).await?;
        info!("Admin seeded: {} ({})", config.admin_name, admin_id);
    }

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(bot.clone()));
    let metrics = Metrics::new();

    // In-memory catalog cache, filled before the first update arrives
    let cache = CatalogCache::new();
    cache.reload(&db).await?;

    let notifier = AdminNotifier::new(messenger.clone(), db.clone());

    let ctx = Ctx {
        messenger: messenger.clone(),
        db: db.clone(),
        state: StateStore::new(),
        cache: cache.clone(),
        notifier: notifier.clone(),
        metrics: metrics.clone(),
    };
    let dispatcher = Arc::new(UpdateDispatcher::new(ctx));
    let handler = BotHandler::new(dispatcher);
    info!("Telegram bot initialized successfully");

    // Scheduled posts: load the timetable, then tick every 30 seconds
    let posts = Arc::new(PostScheduler::new(
        db.clone(),
        messenger.clone(),
        metrics.clone(),
        config.post_channel_id,
    ));
    posts.reload().await?;
    let _post_ticker = posts.clone().spawn();
    info!("Post scheduler started");

    // Reload-signal poller: watches the files the web admin writes
    let signaler = Arc::new(FileSignaler::new(&config.signal_dir));
    let reload_service = Arc::new(ReloadService::new(
        signaler,
        db.clone(),
        cache,
        posts,
        notifier,
        metrics.clone(),
    ));
    let _reload_poller = reload_service.spawn();
    info!("Reload-signal poller started");

    // Nightly database backup
    let mut backup_service = match config.sqlite_path() {
        Some(path) => {
            let mut service =
                match BackupService::new(path, config.backup_dir.clone()).await {
                    Ok(service) => service,
                    Err(e) => {
                        tracing::error!("Failed to create backup service: {}", e);
                        return Err(anyhow::anyhow!("Failed to create backup service: {}", e));
                    }
                };
            if let Err(e) = service.start().await {
                tracing::error!("Failed to start backup service: {}", e);
            }
            Some(service)
        }
        None => {
            tracing::warn!("DATABASE_URL is not a file path, backups disabled");
            None
        }
    };

    // Initialize health service
    let health_service = HealthService::new(db_arc, metrics);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = health_task => {
            if let Err(e) = result2 {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    // Stop the backup scheduler on shutdown
    if let Some(service) = backup_service.as_mut() {
        if let Err(e) = service.stop().await {
            tracing::warn!("Error stopping backup service: {}", e);
        }
    }

    info!("Application stopped");
    Ok(())
}
