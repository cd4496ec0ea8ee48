use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::models::TraderStat;

/// Fold one ingested trade into the trader's running aggregates. Applied
/// unconditionally for every newly ingested trade, independent of position
/// bookkeeping. GREATEST keeps `last_activity_at` monotonic under
/// out-of-order delivery.
pub async fn record_trade(
    conn: &mut PgConnection,
    trader_address: &str,
    notional: Decimal,
    occurred_at: DateTime<Utc>,
) -> Result<TraderStat, sqlx::Error> {
    sqlx::query_as::<_, TraderStat>(
        r#"
        INSERT INTO trader_stats (trader_address, total_volume, total_bets, last_activity_at)
        VALUES ($1, $2, 1, $3)
        ON CONFLICT (trader_address) DO UPDATE
        SET total_volume = trader_stats.total_volume + EXCLUDED.total_volume,
            total_bets = trader_stats.total_bets + 1,
            last_activity_at = GREATEST(trader_stats.last_activity_at, EXCLUDED.last_activity_at),
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(trader_address)
    .bind(notional)
    .bind(occurred_at)
    .fetch_one(conn)
    .await
}

/// Recompute wins/losses/profit_loss from the full set of the trader's
/// settled positions. Full recomputation rather than increments, so a
/// retried or partially applied settlement can never double-count.
pub async fn recompute_settled(pool: &PgPool, trader_address: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE trader_stats
        SET wins = s.wins,
            losses = s.losses,
            profit_loss = s.profit_loss,
            updated_at = NOW()
        FROM (
            SELECT COUNT(*) FILTER (WHERE realized_pnl >= 0) AS wins,
                   COUNT(*) FILTER (WHERE realized_pnl < 0) AS losses,
                   COALESCE(SUM(realized_pnl), 0) AS profit_loss
            FROM positions
            WHERE trader_address = $1 AND status = 'settled'
        ) s
        WHERE trader_address = $1
        "#,
    )
    .bind(trader_address)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a trader's aggregate row.
pub async fn get_by_address(
    pool: &PgPool,
    trader_address: &str,
) -> Result<Option<TraderStat>, sqlx::Error> {
    sqlx::query_as::<_, TraderStat>("SELECT * FROM trader_stats WHERE trader_address = $1")
        .bind(trader_address)
        .fetch_optional(pool)
        .await
}

/// Traders ordered by realized profit. Traders with fewer than
/// `min_settled_markets` settled markets are filtered out here at read
/// time; their rows still exist and keep accumulating.
pub async fn leaderboard(
    pool: &PgPool,
    min_settled_markets: i64,
    limit: i64,
) -> Result<Vec<TraderStat>, sqlx::Error> {
    sqlx::query_as::<_, TraderStat>(
        r#"
        SELECT ts.* FROM trader_stats ts
        WHERE (
            SELECT COUNT(DISTINCT p.market_id)
            FROM positions p
            WHERE p.trader_address = ts.trader_address AND p.status = 'settled'
        ) >= $1
        ORDER BY ts.profit_loss DESC
        LIMIT $2
        "#,
    )
    .bind(min_settled_markets)
    .bind(limit)
    .fetch_all(pool)
    .await
}
