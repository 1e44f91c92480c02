use crate::models::{Fill, Trade, TradeAction};
use crate::store::Store;
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Smallest buy notional worth executing, in currency units. Buys sized
/// below this are skipped as an informational no-op.
pub const MIN_TRADE_NOTIONAL: f64 = 0.0001;

/// What the executor did with a non-Hold signal
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The fill was committed and appended to the ledger
    Filled(Trade),
    /// Buy skipped: the sized spend fell below [`MIN_TRADE_NOTIONAL`]
    SkippedBelowMinimum,
    /// Sell skipped: nothing held for this symbol
    SkippedNoHolding,
}

/// Applies the position-sizing policy and mutates account state.
///
/// Buys commit a configured fraction of the current cash balance; sells
/// liquidate the entire position. Each fill is one atomic store commit.
/// `execute` takes `&mut self` so a shared executor behind a mutex
/// serializes the cash read-modify-write across symbols.
pub struct TradeExecutor<S> {
    store: Arc<S>,
    position_size_fraction: f64,
}

impl<S: Store> TradeExecutor<S> {
    pub fn new(store: Arc<S>, position_size_fraction: f64) -> Self {
        Self {
            store,
            position_size_fraction,
        }
    }

    /// Execute a buy or sell at the given price
    pub async fn execute(
        &mut self,
        symbol: &str,
        action: TradeAction,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<ExecutionOutcome> {
        match action {
            TradeAction::Buy => self.execute_buy(symbol, price, timestamp).await,
            TradeAction::Sell => self.execute_sell(symbol, price, timestamp).await,
        }
    }

    async fn execute_buy(
        &mut self,
        symbol: &str,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<ExecutionOutcome> {
        let cash = self.store.cash_balance().await?;
        let spend = cash * self.position_size_fraction;

        if spend < MIN_TRADE_NOTIONAL {
            tracing::info!("Not enough cash to buy {} (spend {:.8})", symbol, spend);
            return Ok(ExecutionOutcome::SkippedBelowMinimum);
        }

        let quantity = spend / price;
        let held = self.store.holding(symbol).await?;

        let fill = Fill {
            timestamp,
            symbol: symbol.to_string(),
            action: TradeAction::Buy,
            price,
            quantity,
            new_cash: cash - spend,
            new_holding: held + quantity,
        };

        let trade = self.store.commit_fill(&fill).await?;

        tracing::info!(
            "Bought {:.6} {} at {:.2}, new cash balance {:.2}",
            quantity,
            symbol,
            price,
            trade.balance
        );

        Ok(ExecutionOutcome::Filled(trade))
    }

    async fn execute_sell(
        &mut self,
        symbol: &str,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<ExecutionOutcome> {
        let held = self.store.holding(symbol).await?;

        if held <= 0.0 {
            tracing::debug!("Sell signal for {} with no holding, skipping", symbol);
            return Ok(ExecutionOutcome::SkippedNoHolding);
        }

        // Liquidate the entire position; no partial sells.
        let cash = self.store.cash_balance().await?;
        let proceeds = held * price;

        let fill = Fill {
            timestamp,
            symbol: symbol.to_string(),
            action: TradeAction::Sell,
            price,
            quantity: -held,
            new_cash: cash + proceeds,
            new_holding: 0.0,
        };

        let trade = self.store.commit_fill(&fill).await?;

        tracing::info!(
            "Sold {:.6} {} at {:.2}, new cash balance {:.2}",
            held,
            symbol,
            price,
            trade.balance
        );

        Ok(ExecutionOutcome::Filled(trade))
    }
}
