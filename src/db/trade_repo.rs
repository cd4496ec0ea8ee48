use sqlx::{PgConnection, PgPool};

use crate::models::{NormalizedTrade, TradeRow};

/// Insert a trade fact. The unique constraint on `external_id` makes this
/// the idempotency gate: a duplicate returns `None` and writes nothing.
pub async fn insert_trade(
    conn: &mut PgConnection,
    trade: &NormalizedTrade,
) -> Result<Option<TradeRow>, sqlx::Error> {
    sqlx::query_as::<_, TradeRow>(
        r#"
        INSERT INTO trades (external_id, market_id, trader_address, outcome,
                            share_amount, notional, price, occurred_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (external_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(&trade.external_id)
    .bind(&trade.market_id)
    .bind(&trade.trader_address)
    .bind(&trade.outcome)
    .bind(trade.share_amount)
    .bind(trade.notional)
    .bind(trade.price)
    .bind(trade.occurred_at)
    .fetch_optional(conn)
    .await
}

/// Fetch a trade fact by the feed's external id.
pub async fn get_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<TradeRow>, sqlx::Error> {
    sqlx::query_as::<_, TradeRow>("SELECT * FROM trades WHERE external_id = $1")
        .bind(external_id)
        .fetch_optional(pool)
        .await
}

/// Get all trades for a trader, newest first.
pub async fn get_trades_by_trader(
    pool: &PgPool,
    trader_address: &str,
) -> Result<Vec<TradeRow>, sqlx::Error> {
    sqlx::query_as::<_, TradeRow>(
        "SELECT * FROM trades WHERE trader_address = $1 ORDER BY occurred_at DESC",
    )
    .bind(trader_address)
    .fetch_all(pool)
    .await
}
