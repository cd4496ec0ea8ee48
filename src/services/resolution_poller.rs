use std::sync::Arc;

use metrics::counter;
use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::db::market_repo;
use crate::errors::LedgerError;
use crate::feed::{derive_resolution, DataClient};
use crate::ingestion::{settle_market, SettlementOutcome};
use crate::services::notifier::{format_settlement, Notifier};

/// Periodically poll unresolved markets and settle positions once an
/// outcome is known. One market's failure never stops the sweep.
pub async fn run_resolution_poller(
    pool: PgPool,
    data_client: DataClient,
    interval_secs: u64,
    notifier: Option<Arc<Notifier>>,
) {
    tracing::info!(interval_secs = interval_secs, "Resolution poller started");

    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;

        let unresolved = match market_repo::get_unresolved_markets(&pool).await {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch unresolved markets");
                continue;
            }
        };

        if unresolved.is_empty() {
            tracing::debug!("No unresolved markets to check");
            continue;
        }

        for market in &unresolved {
            let api_market = match data_client.get_market(&market.market_id).await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        market_id = %market.market_id,
                        "Failed to fetch market from feed — will retry"
                    );
                    continue;
                }
            };

            let fact = derive_resolution(&api_market);
            if !fact.resolved {
                continue;
            }

            let Some(winner) = fact.winning_outcome.as_deref() else {
                // Closed but no outcome cleared the winner bar yet; keep
                // polling rather than guessing.
                tracing::debug!(
                    market_id = %market.market_id,
                    "Market closed without a clear winner yet"
                );
                continue;
            };

            tracing::info!(
                market_id = %market.market_id,
                winning_outcome = %winner,
                "Market resolved"
            );

            match settle_market(&pool, &market.market_id, Some(winner)).await {
                Ok(SettlementOutcome::Settled {
                    positions_settled,
                    traders_updated,
                }) => {
                    if let Err(e) =
                        market_repo::mark_resolved(&pool, &market.market_id, Some(winner)).await
                    {
                        tracing::error!(
                            error = %e,
                            market_id = %market.market_id,
                            "Failed to mark market resolved"
                        );
                        continue;
                    }

                    counter!("markets_settled_total").increment(1);

                    tracing::info!(
                        market_id = %market.market_id,
                        positions = positions_settled,
                        traders = traders_updated,
                        "Market settled"
                    );

                    if positions_settled > 0 {
                        if let Some(n) = notifier.as_deref() {
                            n.send(&format_settlement(
                                &market.market_id,
                                winner,
                                positions_settled,
                            ))
                            .await;
                        }
                    }
                }
                Ok(SettlementOutcome::NoWinner) => {}
                Err(LedgerError::ResolutionInconsistent { market_id, outcome }) => {
                    // Refused: the winner matches no known outcome label.
                    // Positions stay open; the market stays on the worklist.
                    tracing::error!(
                        market_id = %market_id,
                        outcome = %outcome,
                        "Settlement refused: unrecognized winning outcome"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        market_id = %market.market_id,
                        "Settlement failed"
                    );
                }
            }
        }
    }
}
