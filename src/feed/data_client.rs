use reqwest::Client;
use thiserror::Error;

use super::types::{ApiMarket, ApiTrade};

#[derive(Debug, Error)]
pub enum DataClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Read-only client for the market-data feed. Purely a fetcher: retry and
/// backoff belong to the calling poller, idempotency to the ledger.
#[derive(Debug, Clone)]
pub struct DataClient {
    http: Client,
    base_url: String,
}

impl DataClient {
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Fetch the most recent trades across all markets. The feed is
    /// at-least-once: overlapping windows and duplicates are expected.
    pub async fn get_recent_trades(&self, limit: u32) -> Result<Vec<ApiTrade>, DataClientError> {
        let url = format!("{}/trades", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let trades: Vec<ApiTrade> = resp.json().await?;
        Ok(trades)
    }

    /// Fetch a single market listing by its id.
    pub async fn get_market(&self, market_id: &str) -> Result<ApiMarket, DataClientError> {
        let url = format!("{}/markets/{}", self.base_url, market_id);
        let resp = self.http.get(&url).send().await?.error_for_status()?;

        let market: ApiMarket = resp.json().await?;
        Ok(market)
    }

    /// Fetch active market listings.
    pub async fn get_markets(&self) -> Result<Vec<ApiMarket>, DataClientError> {
        let url = format!("{}/markets", self.base_url);
        let resp = self.http.get(&url).send().await?.error_for_status()?;

        let markets: Vec<ApiMarket> = resp.json().await?;
        Ok(markets)
    }
}
