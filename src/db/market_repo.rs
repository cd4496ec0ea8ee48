use chrono::Utc;
use sqlx::PgPool;

use crate::models::Market;

/// Insert or refresh a market listing from the feed. Outcome labels are the
/// settlement-time validation universe, so they are kept current.
pub async fn upsert_market(
    pool: &PgPool,
    market_id: &str,
    question: Option<&str>,
    category: Option<&str>,
    outcomes: &[String],
    closed: bool,
) -> Result<Market, sqlx::Error> {
    sqlx::query_as::<_, Market>(
        r#"
        INSERT INTO markets (market_id, question, category, outcomes, closed)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (market_id) DO UPDATE
        SET question = EXCLUDED.question,
            category = EXCLUDED.category,
            outcomes = EXCLUDED.outcomes,
            closed = EXCLUDED.closed,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(market_id)
    .bind(question)
    .bind(category)
    .bind(outcomes)
    .bind(closed)
    .fetch_one(pool)
    .await
}

/// Ensure a market row exists for a market seen only through its trades.
pub async fn ensure_market(pool: &PgPool, market_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO markets (market_id)
        VALUES ($1)
        ON CONFLICT (market_id) DO NOTHING
        "#,
    )
    .bind(market_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_market(pool: &PgPool, market_id: &str) -> Result<Option<Market>, sqlx::Error> {
    sqlx::query_as::<_, Market>("SELECT * FROM markets WHERE market_id = $1")
        .bind(market_id)
        .fetch_optional(pool)
        .await
}

/// Markets not yet resolved — the resolution poller's worklist.
pub async fn get_unresolved_markets(pool: &PgPool) -> Result<Vec<Market>, sqlx::Error> {
    sqlx::query_as::<_, Market>("SELECT * FROM markets WHERE resolved = FALSE")
        .fetch_all(pool)
        .await
}

/// Record the resolution fact on the market row.
pub async fn mark_resolved(
    pool: &PgPool,
    market_id: &str,
    winning_outcome: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE markets
        SET resolved = TRUE, winning_outcome = $2, resolved_at = $3, updated_at = NOW()
        WHERE market_id = $1
        "#,
    )
    .bind(market_id)
    .bind(winning_outcome)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}
