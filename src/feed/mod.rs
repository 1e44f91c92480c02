// Price feed module
pub mod binance;

pub use binance::BinanceClient;

use crate::Result;
use async_trait::async_trait;

/// External quote source consumed by the simulation cycle.
///
/// Any failure (network error, bad status, malformed payload, non-positive
/// price) surfaces as `EngineError::FeedUnavailable`, which the cycle treats
/// as "no observation this tick for this symbol" and retries next tick.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch the latest price for a symbol
    async fn fetch_price(&self, symbol: &str) -> Result<f64>;
}
