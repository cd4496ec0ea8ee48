use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the markets table. `outcomes` holds the known outcome
/// labels from the feed's market listing; settlement validates the winning
/// outcome against it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Market {
    pub id: Uuid,
    pub market_id: String,
    pub question: Option<String>,
    pub category: Option<String>,
    pub outcomes: Vec<String>,
    pub closed: bool,
    pub resolved: bool,
    pub winning_outcome: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
