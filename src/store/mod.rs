// Persistence substrate for account state, price history and the trade ledger
pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::models::{Fill, PriceObservation, Trade};
use crate::Result;
use async_trait::async_trait;

/// Key-ordered store backing the simulation engine.
///
/// Price history is append-only with idempotent upserts keyed by
/// `(timestamp, symbol)`. The account is a singleton cash row plus a
/// per-symbol holdings map; both are mutated only through [`commit_fill`],
/// which applies the cash debit/credit, the holding update and the ledger
/// append atomically.
///
/// [`commit_fill`]: Store::commit_fill
#[async_trait]
pub trait Store: Send + Sync {
    /// Create the cash row with the starting balance if no account exists
    /// yet. A restart against an existing store keeps the persisted balance.
    async fn init_account(&self, starting_balance: f64) -> Result<()>;

    /// Upsert one price observation. Overwrites on duplicate
    /// `(timestamp, symbol)` so a retried tick is safe.
    async fn record_price(&self, observation: &PriceObservation) -> Result<()>;

    /// Up to `count` most recent prices for `symbol`, oldest first. Returns
    /// fewer when insufficient history exists; never errors on short reads.
    async fn recent_prices(&self, symbol: &str, count: usize) -> Result<Vec<f64>>;

    /// Current cash balance
    async fn cash_balance(&self) -> Result<f64>;

    /// Held quantity for `symbol`, 0.0 when no row exists
    async fn holding(&self, symbol: &str) -> Result<f64>;

    /// Atomically apply a fill: set the cash balance, upsert the holding
    /// (removing the row at quantity zero) and append the trade. Returns the
    /// ledger entry with its assigned monotonically increasing id.
    async fn commit_fill(&self, fill: &Fill) -> Result<Trade>;

    /// Full trade ledger, oldest first
    async fn trades(&self) -> Result<Vec<Trade>>;
}
