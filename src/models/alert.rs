use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Whale,
    MegaWhale,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Whale => "whale",
            AlertKind::MegaWhale => "mega_whale",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "whale" => Some(AlertKind::Whale),
            "mega_whale" => Some(AlertKind::MegaWhale),
            _ => None,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Database row for the alerts table. `trade_id` holds the feed's external
/// trade id and carries a unique constraint, so re-inserting for the same
/// trade is a silent no-op.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: Uuid,
    pub kind: String,
    pub trader_address: String,
    pub market_id: String,
    pub amount: Decimal,
    pub trade_id: String,
    pub created_at: Option<DateTime<Utc>>,
}
