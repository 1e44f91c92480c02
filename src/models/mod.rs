use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observed price, keyed by `(timestamp, symbol)`.
///
/// Re-recording the same key overwrites the prior value, so a retried
/// polling tick never duplicates history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceObservation {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub price: f64,
}

/// Trading signal produced by a strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Side of an executed trade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
        }
    }
}

/// An executed virtual trade, appended to the ledger and never mutated.
///
/// `quantity` is signed: positive for buys, negative for sells. `balance`
/// is the cash balance immediately after the fill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: TradeAction,
    pub price: f64,
    pub quantity: f64,
    pub balance: f64,
}

/// Fully computed account mutation for one fill, committed atomically by the
/// store: cash update, holding update (row removed when quantity hits zero)
/// and ledger append happen together or not at all.
#[derive(Debug, Clone)]
pub struct Fill {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: TradeAction,
    pub price: f64,
    /// Signed fill quantity (positive buy, negative sell)
    pub quantity: f64,
    pub new_cash: f64,
    pub new_holding: f64,
}
