use rust_decimal::Decimal;
use std::env;

const DEFAULT_FEED_URL: &str = "https://data-api.polymarket.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Feed
    pub feed_base_url: String,
    pub feed_timeout_secs: u64,
    pub trade_poll_interval_secs: u64,
    pub trade_poll_limit: u32,
    pub resolution_interval_secs: u64,
    pub market_sync_interval_secs: u64,

    // Ledger
    pub alert_floor: Decimal,
    pub max_apply_attempts: u32,
    pub min_settled_markets: i64,

    // Notifications (optional)
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            feed_base_url: env::var("FEED_BASE_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.into()),
            feed_timeout_secs: parse_env("FEED_TIMEOUT_SECS", 10),
            trade_poll_interval_secs: parse_env("TRADE_POLL_INTERVAL_SECS", 30),
            trade_poll_limit: parse_env("TRADE_POLL_LIMIT", 200),
            resolution_interval_secs: parse_env("RESOLUTION_INTERVAL_SECS", 300),
            market_sync_interval_secs: parse_env("MARKET_SYNC_INTERVAL_SECS", 600),

            alert_floor: env::var("ALERT_FLOOR")
                .unwrap_or_else(|_| "100".into())
                .parse()
                .unwrap_or(Decimal::ONE_HUNDRED),
            max_apply_attempts: parse_env("MAX_APPLY_ATTEMPTS", 3),
            min_settled_markets: parse_env("MIN_SETTLED_MARKETS", 3),

            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
            telegram_chat_id: env::var("TELEGRAM_CHAT_ID").ok(),
        })
    }

    /// Returns true when both Telegram settings are present.
    pub fn has_telegram(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
