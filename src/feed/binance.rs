use super::PriceFeed;
use crate::{EngineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::{sleep, Duration};

const BINANCE_API_BASE: &str = "https://api.binance.com/api/v3";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 2000;

/// Client for the Binance public ticker endpoint
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}

impl BinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(BINANCE_API_BASE)
    }

    /// Create a client against a custom endpoint (used by tests)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Internal method to fetch the ticker once (without retry logic)
    async fn fetch_price_once(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/ticker/price", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| EngineError::FeedUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::FeedUnavailable(format!(
                "Binance returned status {} for {}",
                status, symbol
            )));
        }

        let ticker: TickerPrice = response
            .json()
            .await
            .map_err(|e| EngineError::FeedUnavailable(format!("malformed payload: {}", e)))?;

        let price: f64 = ticker
            .price
            .parse()
            .map_err(|e| EngineError::FeedUnavailable(format!("unparsable price: {}", e)))?;

        if price <= 0.0 {
            return Err(EngineError::FeedUnavailable(format!(
                "non-positive price {} for {}",
                price, symbol
            )));
        }

        Ok(price)
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceFeed for BinanceClient {
    /// Get the current price for a symbol, retrying transient failures with
    /// exponential backoff before giving up for this tick
    async fn fetch_price(&self, symbol: &str) -> Result<f64> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.fetch_price_once(symbol).await {
                Ok(price) => {
                    if attempt > 1 {
                        tracing::info!(
                            "✓ Successfully fetched {} after {} attempts",
                            symbol,
                            attempt
                        );
                    }
                    return Ok(price);
                }
                Err(e) => {
                    if attempt < MAX_RETRIES {
                        let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt - 1);
                        tracing::warn!(
                            "Attempt {}/{} failed for {}: {}. Retrying in {}ms...",
                            attempt,
                            MAX_RETRIES,
                            symbol,
                            e,
                            backoff_ms
                        );
                        sleep(Duration::from_millis(backoff_ms)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| EngineError::FeedUnavailable("all retry attempts failed".into())))
    }
}
