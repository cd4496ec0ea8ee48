use serde_json::json;

use crate::models::Alert;

/// Telegram notification service. Failures are logged but never block the
/// main flow.
#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl Notifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            chat_id,
        }
    }

    /// Send a Telegram message. Failures are logged as warnings.
    pub async fn send(&self, message: &str) {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        let body = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "Markdown",
        });

        match self.http.post(&url).json(&body).send().await {
            Ok(resp) => {
                if !resp.status().is_success() {
                    tracing::warn!(
                        status = %resp.status(),
                        "Telegram sendMessage returned non-2xx"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send Telegram notification");
            }
        }
    }
}

/// Format a whale alert message.
pub fn format_alert(alert: &Alert) -> String {
    let trader_short = if alert.trader_address.len() > 10 {
        format!(
            "{}...{}",
            &alert.trader_address[..6],
            &alert.trader_address[alert.trader_address.len() - 4..]
        )
    } else {
        alert.trader_address.clone()
    };

    format!(
        "*{} bet*\nTrader: `{}`\nNotional: ${}\nMarket: `{}`",
        alert.kind.replace('_', " "),
        trader_short,
        alert.amount.round_dp(2),
        &alert.market_id[..16.min(alert.market_id.len())],
    )
}

/// Format a settlement summary message.
pub fn format_settlement(market_id: &str, winning_outcome: &str, positions: u64) -> String {
    format!(
        "*Market Settled*\nMarket: `{}`\nWinner: {}\nPositions settled: {}",
        &market_id[..16.min(market_id.len())],
        winning_outcome,
        positions,
    )
}
