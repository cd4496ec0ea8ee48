use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the trader_stats table. `total_volume`/`total_bets`
/// accumulate on every ingested trade; `wins`/`losses`/`profit_loss` are
/// recomputed in full from settled positions on each settlement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TraderStat {
    pub id: Uuid,
    pub trader_address: String,
    pub total_volume: Decimal,
    pub total_bets: i64,
    pub wins: i64,
    pub losses: i64,
    pub profit_loss: Decimal,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
