use std::collections::HashSet;

use metrics::counter;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::db::{market_repo, position_repo, trader_repo};
use crate::errors::LedgerError;

/// Result of settling one market.
#[derive(Debug, PartialEq, Eq)]
pub enum SettlementOutcome {
    Settled {
        positions_settled: u64,
        traders_updated: usize,
    },
    /// The market resolved with no determinable winner; nothing was touched.
    NoWinner,
}

/// Realized profit or loss for a settled position: a winning share pays out
/// one unit, a losing position forfeits its stake.
pub fn realized_pnl(shares: Decimal, avg_price: Decimal, won: bool) -> Decimal {
    if won {
        shares * (Decimal::ONE - avg_price)
    } else {
        -(shares * avg_price)
    }
}

/// Settle every open position in a market against its winning outcome, then
/// recompute each affected trader's settled aggregates from scratch.
///
/// The winner must match a known outcome label for the market (from the
/// synced listing, falling back to the labels on the market's own
/// positions); anything else refuses the whole settlement and leaves
/// positions open. Re-invoking on an already-settled market is a no-op —
/// the per-position status guard filters out settled rows.
pub async fn settle_market(
    pool: &PgPool,
    market_id: &str,
    winning_outcome: Option<&str>,
) -> Result<SettlementOutcome, LedgerError> {
    let Some(winner) = winning_outcome else {
        tracing::info!(market_id = %market_id, "Market resolved without a winner, settling nothing");
        return Ok(SettlementOutcome::NoWinner);
    };

    let known = known_outcomes(pool, market_id).await?;
    if known.is_empty() {
        // Market never traded here; zero positions to settle.
        return Ok(SettlementOutcome::Settled {
            positions_settled: 0,
            traders_updated: 0,
        });
    }
    if !known.iter().any(|o| o.eq_ignore_ascii_case(winner)) {
        counter!("settlements_refused_total").increment(1);
        return Err(LedgerError::ResolutionInconsistent {
            market_id: market_id.to_string(),
            outcome: winner.to_string(),
        });
    }

    let open_positions = position_repo::get_open_by_market(pool, market_id).await?;

    let mut positions_settled: u64 = 0;
    let mut affected: HashSet<String> = HashSet::new();

    for pos in &open_positions {
        let won = pos.outcome.eq_ignore_ascii_case(winner);
        let pnl = realized_pnl(pos.shares, pos.avg_price, won);

        match position_repo::settle(pool, pos.id, pnl).await {
            Ok(rows) => {
                if rows > 0 {
                    positions_settled += rows;
                    tracing::info!(
                        position_id = %pos.id,
                        market_id = %market_id,
                        trader = %pos.trader_address,
                        won = won,
                        pnl = %pnl,
                        "Position settled"
                    );
                }
                affected.insert(pos.trader_address.clone());
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    position_id = %pos.id,
                    market_id = %market_id,
                    "Failed to settle position"
                );
            }
        }
    }

    // Full recomputation over each trader's settled positions — never
    // incremental, so a retried or raced settlement cannot double-count.
    let mut traders_updated = 0usize;
    for trader in &affected {
        match trader_repo::recompute_settled(pool, trader).await {
            Ok(()) => traders_updated += 1,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    trader = %trader,
                    "Failed to recompute trader aggregates"
                );
            }
        }
    }

    counter!("positions_settled_total").increment(positions_settled);

    Ok(SettlementOutcome::Settled {
        positions_settled,
        traders_updated,
    })
}

/// Outcome labels the market is known to have: the synced listing when
/// available, otherwise whatever labels its positions carry.
async fn known_outcomes(pool: &PgPool, market_id: &str) -> Result<Vec<String>, sqlx::Error> {
    if let Some(market) = market_repo::get_market(pool, market_id).await? {
        if !market.outcomes.is_empty() {
            return Ok(market.outcomes);
        }
    }
    position_repo::outcome_labels(pool, market_id).await
}
