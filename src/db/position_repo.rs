use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::Position;

/// Lock and return the open position for a ledger key, if any. The row lock
/// serializes concurrent writers on the same (trader, market, outcome) key
/// while leaving other keys untouched.
pub async fn get_open_for_update(
    conn: &mut PgConnection,
    trader_address: &str,
    market_id: &str,
    outcome: &str,
) -> Result<Option<Position>, sqlx::Error> {
    sqlx::query_as::<_, Position>(
        r#"
        SELECT * FROM positions
        WHERE trader_address = $1 AND market_id = $2 AND outcome = $3 AND status = 'open'
        FOR UPDATE
        "#,
    )
    .bind(trader_address)
    .bind(market_id)
    .bind(outcome)
    .fetch_optional(conn)
    .await
}

/// Open a fresh position. A concurrent insert for the same key trips the
/// partial unique index and the whole transaction is retried.
pub async fn insert_open(
    conn: &mut PgConnection,
    trader_address: &str,
    market_id: &str,
    outcome: &str,
    shares: Decimal,
    avg_price: Decimal,
    opened_at: DateTime<Utc>,
) -> Result<Position, sqlx::Error> {
    sqlx::query_as::<_, Position>(
        r#"
        INSERT INTO positions (trader_address, market_id, outcome, shares, avg_price, opened_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(trader_address)
    .bind(market_id)
    .bind(outcome)
    .bind(shares)
    .bind(avg_price)
    .bind(opened_at)
    .fetch_one(conn)
    .await
}

/// Replace the running (shares, avg_price) pair on an open position.
pub async fn update_entry(
    conn: &mut PgConnection,
    id: Uuid,
    shares: Decimal,
    avg_price: Decimal,
) -> Result<Position, sqlx::Error> {
    sqlx::query_as::<_, Position>(
        r#"
        UPDATE positions
        SET shares = $2, avg_price = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(shares)
    .bind(avg_price)
    .fetch_one(conn)
    .await
}

/// Settle one position. The status guard makes re-settlement a no-op;
/// returns the number of rows actually transitioned (0 or 1).
pub async fn settle(
    pool: &PgPool,
    id: Uuid,
    realized_pnl: Decimal,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE positions
        SET status = 'settled', realized_pnl = $2, settled_at = NOW()
        WHERE id = $1 AND status = 'open'
        "#,
    )
    .bind(id)
    .bind(realized_pnl)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// All open positions in a market, oldest first.
pub async fn get_open_by_market(
    pool: &PgPool,
    market_id: &str,
) -> Result<Vec<Position>, sqlx::Error> {
    sqlx::query_as::<_, Position>(
        "SELECT * FROM positions WHERE market_id = $1 AND status = 'open' ORDER BY opened_at",
    )
    .bind(market_id)
    .fetch_all(pool)
    .await
}

/// Distinct outcome labels seen across all positions of a market,
/// settled or open. Used as the fallback outcome universe when the
/// market listing was never synced.
pub async fn outcome_labels(pool: &PgPool, market_id: &str) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT DISTINCT outcome FROM positions WHERE market_id = $1")
            .bind(market_id)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// All positions for a trader, newest first.
pub async fn get_by_trader(
    pool: &PgPool,
    trader_address: &str,
) -> Result<Vec<Position>, sqlx::Error> {
    sqlx::query_as::<_, Position>(
        "SELECT * FROM positions WHERE trader_address = $1 ORDER BY opened_at DESC",
    )
    .bind(trader_address)
    .fetch_all(pool)
    .await
}

/// All open positions, newest first.
pub async fn get_open_positions(pool: &PgPool, limit: i64) -> Result<Vec<Position>, sqlx::Error> {
    sqlx::query_as::<_, Position>(
        "SELECT * FROM positions WHERE status = 'open' ORDER BY opened_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Count open positions.
pub async fn count_open_positions(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM positions WHERE status = 'open'")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}
