//! Pair Sentinel - token pair safety screening service
//!
//! Wires the evaluator to the Telegram bot, the watchlist monitor and the
//! health / metrics server, then runs until Ctrl-C.

use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pair_sentinel::bot::{self, CommandHandler, TelegramClient};
use pair_sentinel::config::{AppConfig, BlacklistConfig};
use pair_sentinel::handlers::{self, AppState};
use pair_sentinel::monitor::{self, WatchlistMonitor};
use pair_sentinel::notifications::{CompositeNotifier, TelegramNotifier};
use pair_sentinel::sources::{self, DexScreenerClient, RugcheckClient};
use pair_sentinel::{
    BlacklistStore, MetricsState, PolicyStore, PositionBook, SafetyEvaluator, Watchlist,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    tracing::info!("Starting Pair Sentinel v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;
    tracing::info!(
        risk_source = %config.sources.risk.base_url,
        market_source = %config.sources.market.base_url,
        "Configuration loaded"
    );

    let blacklist_config = BlacklistConfig::load(&config.blacklist_path).map_err(|e| {
        tracing::error!(
            error = %e,
            path = %config.blacklist_path.display(),
            "Failed to load blacklist"
        );
        anyhow::anyhow!("Blacklist error: {}", e)
    })?;
    let blacklist = Arc::new(BlacklistStore::new(blacklist_config));
    let (tokens, developers, patterns) = blacklist.entry_counts();
    tracing::info!(
        tokens = tokens,
        developers = developers,
        patterns = patterns,
        "Blacklist loaded"
    );

    let policy = Arc::new(PolicyStore::new(config.policy())?);
    let metrics = Arc::new(MetricsState::new());

    // Data sources share one connection pool
    let http = sources::build_http_client()?;
    let risk_source = Arc::new(RugcheckClient::new(http.clone(), &config.sources.risk));
    let market_source = Arc::new(DexScreenerClient::new(http.clone(), &config.sources.market));

    let evaluator = Arc::new(SafetyEvaluator::new(
        blacklist.clone(),
        risk_source,
        market_source,
        policy.clone(),
        metrics.clone(),
    ));
    tracing::info!("Safety evaluator initialized");

    let watchlist = Arc::new(Watchlist::new());
    let positions = Arc::new(PositionBook::new());
    let cancel_token = CancellationToken::new();
    let mut tasks = Vec::new();

    // Telegram bot and alerts
    let mut notifier = CompositeNotifier::new();
    if config.telegram.enabled {
        if config.telegram.chat_id.is_none() {
            tracing::warn!(
                "telegram.chat_id is not set: any chat can issue commands, including policy updates"
            );
        }
        let telegram = Arc::new(TelegramClient::new(http.clone(), &config.telegram));
        notifier.add_service(Arc::new(TelegramNotifier::new(
            telegram.clone(),
            config.telegram.chat_id,
            config.telegram.enabled,
            config.telegram.rate_limit_seconds,
        )));

        let handler = Arc::new(CommandHandler::new(
            evaluator.clone(),
            watchlist.clone(),
            positions.clone(),
            policy.clone(),
            metrics.clone(),
        ));
        tasks.push(tokio::spawn(bot::run_bot(
            telegram,
            handler,
            config.telegram.chat_id,
            cancel_token.clone(),
        )));
        tracing::info!("Telegram bot started");
    } else {
        tracing::warn!("Telegram disabled, commands and alerts are off");
    }
    let notifier = Arc::new(notifier);

    // Watchlist monitor
    if config.monitoring.enabled {
        let watchlist_monitor = Arc::new(WatchlistMonitor::new(
            evaluator.clone(),
            watchlist.clone(),
            policy.clone(),
            notifier.clone(),
            metrics.clone(),
            config.monitoring.evaluation_timeout(),
        ));
        tasks.push(tokio::spawn(monitor::run_monitor(
            watchlist_monitor,
            cancel_token.clone(),
        )));
        tracing::info!("Watchlist monitor started");
    }

    // Health and metrics server
    if config.server.enabled {
        let app_state = Arc::new(AppState {
            started_at: Utc::now(),
            watchlist: watchlist.clone(),
            policy: policy.clone(),
            blacklist: blacklist.clone(),
        });
        let app = handlers::router(app_state, metrics.clone());

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "Server listening");

        let shutdown = cancel_token.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
            {
                tracing::error!(error = %e, "HTTP server failed");
            }
        }));
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    cancel_token.cancel();

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Task ended abnormally");
        }
    }

    tracing::info!("Pair Sentinel stopped");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pair_sentinel=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Load and validate configuration
fn load_config() -> anyhow::Result<AppConfig> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    Ok(config)
}
