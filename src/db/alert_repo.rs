use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::models::{Alert, AlertKind};

/// Persist an alert keyed by the trade's external id. A duplicate insert is
/// a silent no-op (`None`), never an error.
pub async fn insert_if_absent(
    conn: &mut PgConnection,
    kind: AlertKind,
    trader_address: &str,
    market_id: &str,
    amount: Decimal,
    trade_id: &str,
) -> Result<Option<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(
        r#"
        INSERT INTO alerts (kind, trader_address, market_id, amount, trade_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (trade_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(kind.as_str())
    .bind(trader_address)
    .bind(market_id)
    .bind(amount)
    .bind(trade_id)
    .fetch_optional(conn)
    .await
}

/// Most recent alerts first.
pub async fn get_recent(pool: &PgPool, limit: i64) -> Result<Vec<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>("SELECT * FROM alerts ORDER BY created_at DESC LIMIT $1")
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// All alerts recorded for one trade id (0 or 1 rows).
pub async fn get_by_trade_id(pool: &PgPool, trade_id: &str) -> Result<Vec<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE trade_id = $1")
        .bind(trade_id)
        .fetch_all(pool)
        .await
}
