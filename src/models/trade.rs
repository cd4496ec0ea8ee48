use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Canonical trade produced by the normalizer. The feed's external id is the
/// idempotency key; the row is append-only and never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTrade {
    pub external_id: String,
    pub market_id: String,
    pub trader_address: String,
    pub outcome: String,
    pub share_amount: Decimal,
    pub notional: Decimal,
    pub price: Decimal,
    pub occurred_at: DateTime<Utc>,
    /// Below the dust threshold: ingested normally but skipped for alerting.
    pub below_alert_floor: bool,
}

/// Database row for the trades table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeRow {
    pub id: Uuid,
    pub external_id: String,
    pub market_id: String,
    pub trader_address: String,
    pub outcome: String,
    pub share_amount: Decimal,
    pub notional: Decimal,
    pub price: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}
