use std::time::Instant;

use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::time::{sleep, Duration};

use crate::db::{alert_repo, position_repo, trade_repo, trader_repo};
use crate::errors::LedgerError;
use crate::ingestion::alerts::classify;
use crate::models::{Alert, NormalizedTrade, Position, TradeRow};

/// Result of pushing one trade through the ledger.
#[derive(Debug)]
pub enum ApplyOutcome {
    /// The trade was new; all effects landed in one transaction.
    Applied(AppliedTrade),
    /// A trade with the same external id was already applied. Nothing was
    /// mutated; the previously stored fact is returned. Observable for
    /// counters, success-shaped for control flow.
    Duplicate { prior: Option<TradeRow> },
}

#[derive(Debug)]
pub struct AppliedTrade {
    pub trade: TradeRow,
    pub position: Position,
    pub alert: Option<Alert>,
}

/// Fold a new shares/price fill into an existing (shares, avg_price) pair.
pub fn weighted_average(
    shares: Decimal,
    avg_price: Decimal,
    delta_shares: Decimal,
    price: Decimal,
) -> (Decimal, Decimal) {
    let combined = shares + delta_shares;
    let avg = (shares * avg_price + delta_shares * price) / combined;
    (combined, avg)
}

/// Apply one normalized trade to the ledger: insert the trade fact
/// (idempotency gate), update the position under weighted-average-cost,
/// fold the trader aggregates, and emit at most one alert — all in a single
/// transaction, retried on write conflicts up to `max_attempts`.
///
/// Same-key writers serialize on the position row lock; distinct keys never
/// contend. A conflict that survives every retry surfaces as
/// `LedgerUnavailable` for this one trade; resubmission is safe because the
/// trade-fact insert dedupes on external id.
pub async fn apply_trade(
    pool: &PgPool,
    trade: &NormalizedTrade,
    max_attempts: u32,
) -> Result<ApplyOutcome, LedgerError> {
    let start = Instant::now();
    let mut attempt: u32 = 0;

    let outcome = loop {
        attempt += 1;
        match apply_once(pool, trade).await {
            Ok(outcome) => break outcome,
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(
                    external_id = %trade.external_id,
                    attempt = attempt,
                    error = %e,
                    "Write conflict applying trade, retrying"
                );
                sleep(Duration::from_millis(25 * u64::from(attempt))).await;
            }
            Err(e) if e.is_retryable() => {
                return Err(LedgerError::LedgerUnavailable {
                    key: format!(
                        "{}/{}/{}",
                        trade.trader_address, trade.market_id, trade.outcome
                    ),
                    attempts: attempt,
                });
            }
            Err(e) => return Err(e),
        }
    };

    histogram!("ledger_apply_seconds").record(start.elapsed().as_secs_f64());
    match &outcome {
        ApplyOutcome::Applied(applied) => {
            counter!("trades_ingested_total").increment(1);
            if applied.alert.is_some() {
                counter!("alerts_emitted_total").increment(1);
            }
        }
        ApplyOutcome::Duplicate { .. } => {
            counter!("trades_duplicate_total").increment(1);
        }
    }

    Ok(outcome)
}

async fn apply_once(
    pool: &PgPool,
    trade: &NormalizedTrade,
) -> Result<ApplyOutcome, LedgerError> {
    let mut tx = pool.begin().await?;

    // Idempotency gate: the trade fact goes in first, before any aggregate
    // mutation. A duplicate external id writes nothing at all.
    let Some(trade_row) = trade_repo::insert_trade(&mut tx, trade).await? else {
        tx.rollback().await?;
        let prior = trade_repo::get_by_external_id(pool, &trade.external_id).await?;
        return Ok(ApplyOutcome::Duplicate { prior });
    };

    // Weighted-average-cost position update on the open position for this
    // (trader, market, outcome) key. A settled position is never matched,
    // so post-resolution trades open a fresh one.
    let position = match position_repo::get_open_for_update(
        &mut tx,
        &trade.trader_address,
        &trade.market_id,
        &trade.outcome,
    )
    .await?
    {
        Some(pos) => {
            let (shares, avg_price) = weighted_average(
                pos.shares,
                pos.avg_price,
                trade.share_amount,
                trade.price,
            );
            position_repo::update_entry(&mut tx, pos.id, shares, avg_price).await?
        }
        None => {
            position_repo::insert_open(
                &mut tx,
                &trade.trader_address,
                &trade.market_id,
                &trade.outcome,
                trade.share_amount,
                trade.price,
                trade.occurred_at,
            )
            .await?
        }
    };

    // Trader aggregates accumulate from every ingested trade regardless of
    // settlement state.
    trader_repo::record_trade(
        &mut tx,
        &trade.trader_address,
        trade.notional,
        trade.occurred_at,
    )
    .await?;

    // Alert emission, deduped on trade id. Dust trades skip classification.
    let alert = if trade.below_alert_floor {
        None
    } else if let Some(kind) = classify(trade.notional) {
        alert_repo::insert_if_absent(
            &mut tx,
            kind,
            &trade.trader_address,
            &trade.market_id,
            trade.notional,
            &trade.external_id,
        )
        .await?
    } else {
        None
    };

    tx.commit().await?;

    Ok(ApplyOutcome::Applied(AppliedTrade {
        trade: trade_row,
        position,
        alert,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_average_two_fills() {
        // 5000 @ 0.40 → 12500 shares; then 3000 @ 0.60 → 5000 shares.
        let (shares, avg) = weighted_average(
            Decimal::from(12_500),
            Decimal::new(40, 2),
            Decimal::from(5_000),
            Decimal::new(60, 2),
        );
        assert_eq!(shares, Decimal::from(17_500));
        // (12500·0.40 + 5000·0.60) / 17500 = 8000 / 17500
        assert_eq!(avg, Decimal::from(8_000) / Decimal::from(17_500));
    }

    #[test]
    fn test_weighted_average_single_fill_keeps_price() {
        let (shares, avg) = weighted_average(
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::from(250),
            Decimal::new(35, 2),
        );
        assert_eq!(shares, Decimal::from(250));
        assert_eq!(avg, Decimal::new(35, 2));
    }

    #[test]
    fn test_weighted_average_matches_total_cost_identity() {
        // avg must equal Σ nᵢ / Σ (nᵢ/pᵢ) across any fill sequence.
        let fills = [
            (Decimal::from(1_000), Decimal::new(25, 2)),
            (Decimal::from(700), Decimal::new(50, 2)),
            (Decimal::from(4_200), Decimal::new(84, 2)),
        ];

        let mut shares = Decimal::ZERO;
        let mut avg = Decimal::ZERO;
        let mut total_notional = Decimal::ZERO;
        let mut total_shares = Decimal::ZERO;

        for (notional, price) in fills {
            let delta = notional / price;
            (shares, avg) = weighted_average(shares, avg, delta, price);
            total_notional += notional;
            total_shares += delta;
        }

        assert_eq!(shares, total_shares);
        let expected = total_notional / total_shares;
        let diff = (avg - expected).abs();
        assert!(diff < Decimal::new(1, 12), "avg {avg} != expected {expected}");
    }
}
