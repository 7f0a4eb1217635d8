use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grocery_bot::background::retention;
use grocery_bot::config::BotConfig;
use grocery_bot::dispatch::{BotIdentity, Dispatcher};
use grocery_bot::lifecycle::Lifecycle;
use grocery_bot::notify::Notifier;
use grocery_bot::state::AppState;
use grocery_bot::telegram::TelegramApi;
use grocery_bot::{polling, routes};
use grocery_translate::TranslatorConfig;

/// Headroom on top of the long-poll timeout for each Bot API call.
const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "grocery_bot=debug,grocery_db=info,grocery_translate=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = BotConfig::from_env().context("Invalid bot configuration")?;
    tracing::info!(
        volunteer_chat_id = config.volunteer_chat_id,
        coordinators = config.coordinators.len(),
        webhook = config.is_webhook_mode(),
        "Loaded bot configuration"
    );

    let translator = TranslatorConfig::from_env()
        .and_then(|cfg| cfg.build())
        .context("Invalid translator configuration")?;

    // --- Database ---
    if let Some(dir) = sqlite_parent_dir(&config.database_url) {
        std::fs::create_dir_all(dir).context("Failed to create database directory")?;
    }
    let pool = grocery_db::create_pool(&config.database_url)
        .await
        .context("Failed to open database")?;
    grocery_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    grocery_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    let lifecycle = Arc::new(Lifecycle::new(
        pool.clone(),
        config.coordinators.clone(),
        translator,
    ));
    lifecycle
        .seed_coordinators()
        .await
        .context("Failed to seed coordinators")?;

    // --- Telegram ---
    let api = Arc::new(
        TelegramApi::new(
            &config.telegram_api_url,
            &config.telegram_token,
            config.poll_timeout + HTTP_TIMEOUT_MARGIN,
        )
        .context("Failed to build Telegram client")?,
    );
    let me = api.get_me().await.context("Telegram authorization failed")?;
    tracing::info!(bot_id = me.id, username = ?me.username, "Authorized with Telegram");

    let notifier: Arc<dyn Notifier> = api.clone();
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&lifecycle),
        notifier,
        config.volunteer_chat_id,
        BotIdentity {
            id: me.id,
            username: me.username,
        },
    ));

    // --- Retention sweeper ---
    let cancel = CancellationToken::new();
    let retention_handle = tokio::spawn(retention::run(
        pool.clone(),
        config.retention,
        cancel.clone(),
    ));

    // --- Transport ---
    match &config.webhook_url {
        Some(base_url) => {
            let webhook_url = format!("{base_url}/webhook");
            api.set_webhook(&webhook_url, config.webhook_secret.as_deref())
                .await
                .context("Failed to register webhook")?;
            tracing::info!(%webhook_url, "Webhook registered");

            let state = AppState {
                pool: pool.clone(),
                dispatcher: Arc::clone(&dispatcher),
                webhook_secret: config.webhook_secret.as_deref().map(Arc::from),
            };
            let app = routes::app(state);

            let addr = SocketAddr::new(
                config.host.parse().context("Invalid HOST address")?,
                config.port,
            );
            tracing::info!(%addr, "Starting webhook server");
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .context("Failed to bind to address")?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Server error")?;
        }
        None => {
            let poll_cancel = cancel.child_token();
            let poller = tokio::spawn(polling::run(
                Arc::clone(&api),
                Arc::clone(&dispatcher),
                config.poll_timeout,
                poll_cancel.clone(),
            ));
            shutdown_signal().await;
            poll_cancel.cancel();
            let _ = tokio::time::timeout(Duration::from_secs(5), poller).await;
        }
    }

    // --- Post-shutdown cleanup ---
    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    pool.close().await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Directory holding a file-backed SQLite database, if any.
fn sqlite_parent_dir(database_url: &str) -> Option<&std::path::Path> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    std::path::Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
