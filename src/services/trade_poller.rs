use std::sync::Arc;

use metrics::{counter, gauge};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::db::{market_repo, position_repo};
use crate::errors::LedgerError;
use crate::feed::DataClient;
use crate::ingestion::{apply_trade, normalize_trade, ApplyOutcome};
use crate::services::notifier::{format_alert, Notifier};

/// Poll the feed for recent trades and push each through the ledger.
///
/// The feed is at-least-once with no ordering guarantee: overlapping poll
/// windows and duplicate records are expected, and the ledger's idempotency
/// keys make them harmless. One bad or conflicted trade never stops the
/// batch.
#[allow(clippy::too_many_arguments)]
pub async fn run_trade_poller(
    data_client: DataClient,
    pool: PgPool,
    interval_secs: u64,
    poll_limit: u32,
    alert_floor: Decimal,
    max_apply_attempts: u32,
    notifier: Option<Arc<Notifier>>,
) {
    tracing::info!(interval_secs = interval_secs, "Trade poller started");

    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;

        let raw_trades = match data_client.get_recent_trades(poll_limit).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, "Trade poller: feed fetch failed, will retry");
                continue;
            }
        };

        let mut ingested = 0u32;
        let mut duplicates = 0u32;
        let mut rejected = 0u32;
        let mut unavailable = 0u32;

        for raw in &raw_trades {
            let trade = match normalize_trade(raw, alert_floor) {
                Ok(t) => t,
                Err(e) => {
                    rejected += 1;
                    counter!("trades_rejected_total").increment(1);
                    tracing::debug!(
                        error = %e,
                        external_id = ?raw.id,
                        "Skipping malformed feed record"
                    );
                    continue;
                }
            };

            match apply_trade(&pool, &trade, max_apply_attempts).await {
                Ok(ApplyOutcome::Applied(applied)) => {
                    ingested += 1;

                    // Markets seen only through trades still need a row for
                    // the resolution poller to pick up.
                    if let Err(e) = market_repo::ensure_market(&pool, &trade.market_id).await {
                        tracing::warn!(
                            error = %e,
                            market_id = %trade.market_id,
                            "Failed to register market for resolution tracking"
                        );
                    }

                    if let (Some(alert), Some(n)) = (&applied.alert, notifier.as_deref()) {
                        n.send(&format_alert(alert)).await;
                    }
                }
                Ok(ApplyOutcome::Duplicate { .. }) => duplicates += 1,
                Err(LedgerError::LedgerUnavailable { key, attempts }) => {
                    unavailable += 1;
                    counter!("trades_unavailable_total").increment(1);
                    tracing::error!(
                        key = %key,
                        attempts = attempts,
                        external_id = %trade.external_id,
                        "Ledger unavailable for trade; upstream may resubmit"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        external_id = %trade.external_id,
                        "Failed to apply trade"
                    );
                }
            }
        }

        if ingested > 0 || rejected > 0 || unavailable > 0 {
            tracing::info!(
                ingested = ingested,
                duplicates = duplicates,
                rejected = rejected,
                unavailable = unavailable,
                "Trade poller cycle complete"
            );
        }

        if let Ok(open) = position_repo::count_open_positions(&pool).await {
            gauge!("open_positions").set(open as f64);
        }
    }
}
