use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trade (Data API — REST)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiTrade {
    pub id: Option<String>,
    pub market: Option<String>,
    #[serde(alias = "maker_address", alias = "proxyWallet")]
    pub trader_address: Option<String>,
    pub outcome: Option<String>,
    pub size: Option<Decimal>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub notional: Option<Decimal>,
    pub timestamp: Option<serde_json::Value>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

// ---------------------------------------------------------------------------
// Market listing (Data API)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiOutcomeToken {
    pub outcome: String,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiMarket {
    pub condition_id: String,
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tokens: Vec<ApiOutcomeToken>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub end_date_iso: Option<String>,
}

impl ApiMarket {
    /// Outcome labels in listing order.
    pub fn outcome_labels(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.outcome.clone()).collect()
    }
}
