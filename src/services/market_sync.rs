use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::db::market_repo;
use crate::feed::DataClient;

/// Periodically ingest market listings so settlement has current outcome
/// labels to validate resolution facts against.
pub async fn run_market_sync(data_client: DataClient, pool: PgPool, interval_secs: u64) {
    tracing::info!(interval_secs = interval_secs, "Market sync started");

    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;

        let markets = match data_client.get_markets().await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "Market sync: listing fetch failed, will retry");
                continue;
            }
        };

        let mut synced = 0usize;
        for market in &markets {
            let outcomes = market.outcome_labels();
            if let Err(e) = market_repo::upsert_market(
                &pool,
                &market.condition_id,
                Some(&market.question),
                market.category.as_deref(),
                &outcomes,
                market.closed == Some(true),
            )
            .await
            {
                tracing::warn!(
                    error = %e,
                    market_id = %market.condition_id,
                    "Failed to upsert market listing"
                );
                continue;
            }
            synced += 1;
        }

        tracing::info!(synced = synced, "Market sync cycle complete");
    }
}
