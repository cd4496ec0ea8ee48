use std::sync::Arc;
use std::time::Duration;

use polyledger::api::router::create_router;
use polyledger::config::AppConfig;
use polyledger::db;
use polyledger::feed::DataClient;
use polyledger::metrics::init_metrics;
use polyledger::services::notifier::Notifier;
use polyledger::services::{market_sync, resolution_poller, trade_poller};
use polyledger::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = init_metrics();

    tracing::info!("Connecting to database...");
    let db = db::init_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.feed_timeout_secs))
        .build()?;
    let data_client = DataClient::new(http, config.feed_base_url.clone());

    let notifier = if config.has_telegram() {
        tracing::info!("Telegram notifications enabled");
        Some(Arc::new(Notifier::new(
            config.telegram_bot_token.clone().unwrap(),
            config.telegram_chat_id.clone().unwrap(),
        )))
    } else {
        None
    };

    // --- Ingestion: feed → normalizer → ledger ---
    {
        let client = data_client.clone();
        let pool = db.clone();
        let notifier = notifier.clone();
        let interval = config.trade_poll_interval_secs;
        let limit = config.trade_poll_limit;
        let alert_floor = config.alert_floor;
        let max_attempts = config.max_apply_attempts;
        tokio::spawn(async move {
            trade_poller::run_trade_poller(
                client,
                pool,
                interval,
                limit,
                alert_floor,
                max_attempts,
                notifier,
            )
            .await;
        });
    }

    // --- Settlement: resolution facts → settler ---
    {
        let client = data_client.clone();
        let pool = db.clone();
        let notifier = notifier.clone();
        let interval = config.resolution_interval_secs;
        tokio::spawn(async move {
            resolution_poller::run_resolution_poller(pool, client, interval, notifier).await;
        });
    }

    // --- Market listings: outcome labels for settlement validation ---
    {
        let client = data_client.clone();
        let pool = db.clone();
        let interval = config.market_sync_interval_secs;
        tokio::spawn(async move {
            market_sync::run_market_sync(client, pool, interval).await;
        });
    }

    let state = AppState {
        db,
        config,
        metrics_handle,
        notifier,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
