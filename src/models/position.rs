use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the positions table, keyed logically by
/// (trader_address, market_id, outcome) while open.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: Uuid,
    pub trader_address: String,
    pub market_id: String,
    pub outcome: String,
    pub shares: Decimal,
    pub avg_price: Decimal,
    pub status: String,
    pub realized_pnl: Option<Decimal>,
    pub opened_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}
