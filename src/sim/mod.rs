// Simulation cycle orchestration
use crate::execution::{ExecutionOutcome, TradeExecutor};
use crate::feed::PriceFeed;
use crate::models::{PriceObservation, Signal, TradeAction};
use crate::store::Store;
use crate::strategy::Strategy;
use crate::{EngineError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// One-tick orchestrator: per symbol, fetch a quote, record it, evaluate the
/// strategy and execute any non-Hold signal.
///
/// Timing lives with the caller; `run_cycle` is synchronous from the
/// driver's point of view and directly testable. A feed failure skips that
/// symbol for the tick; persistence failures propagate so a half-written
/// mutation is never silently dropped.
pub struct Simulator<F, S, T> {
    feed: F,
    store: Arc<S>,
    strategy: T,
    executor: TradeExecutor<S>,
    symbols: Vec<String>,
}

impl<F, S, T> Simulator<F, S, T>
where
    F: PriceFeed,
    S: Store,
    T: Strategy,
{
    pub fn new(
        feed: F,
        store: Arc<S>,
        strategy: T,
        executor: TradeExecutor<S>,
        symbols: Vec<String>,
    ) -> Self {
        Self {
            feed,
            store,
            strategy,
            executor,
            symbols,
        }
    }

    /// Run one full cycle over all configured symbols, sharing a single
    /// observation timestamp across the tick
    pub async fn run_cycle(&mut self) -> Result<()> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Cycle with an explicit tick timestamp (deterministic in tests)
    pub async fn run_cycle_at(&mut self, timestamp: DateTime<Utc>) -> Result<()> {
        let symbols = self.symbols.clone();

        for symbol in &symbols {
            match self.run_symbol(symbol, timestamp).await {
                Ok(()) => {}
                Err(EngineError::FeedUnavailable(reason)) => {
                    // Transient: no observation for this symbol this tick.
                    tracing::warn!("✗ {} skipped this tick: {}", symbol, reason);
                }
                Err(e) => return Err(e),
            }
        }

        self.log_account_summary().await?;

        Ok(())
    }

    async fn run_symbol(&mut self, symbol: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let price = self.feed.fetch_price(symbol).await?;

        let observation = PriceObservation {
            timestamp,
            symbol: symbol.to_string(),
            price,
        };
        self.store.record_price(&observation).await?;
        tracing::info!("  ✓ {} @ {:.4}", symbol, price);

        let window = self
            .store
            .recent_prices(symbol, self.strategy.min_prices_required())
            .await?;

        let action = match self.strategy.evaluate(&window) {
            Signal::Hold => {
                tracing::debug!(
                    "    → {} holding ({}/{} observations)",
                    symbol,
                    window.len(),
                    self.strategy.min_prices_required()
                );
                return Ok(());
            }
            Signal::Buy => TradeAction::Buy,
            Signal::Sell => TradeAction::Sell,
        };

        tracing::info!("  Signal: {:?} for {}", action, symbol);

        match self
            .executor
            .execute(symbol, action, price, timestamp)
            .await?
        {
            ExecutionOutcome::Filled(trade) => {
                tracing::info!(
                    "  ✓ Trade {}: {} {:.6} {} @ {:.4}",
                    trade.id,
                    trade.action.as_str(),
                    trade.quantity.abs(),
                    trade.symbol,
                    trade.price
                );
            }
            ExecutionOutcome::SkippedBelowMinimum => {
                tracing::info!("  → {} buy skipped: below minimum trade size", symbol);
            }
            ExecutionOutcome::SkippedNoHolding => {
                tracing::debug!("  → {} sell skipped: nothing held", symbol);
            }
        }

        Ok(())
    }

    async fn log_account_summary(&self) -> Result<()> {
        let cash = self.store.cash_balance().await?;
        tracing::info!("📊 Cash balance: {:.2}", cash);

        for symbol in &self.symbols {
            let held = self.store.holding(symbol).await?;
            if held > 0.0 {
                tracing::info!("    {} | Holding: {:.6}", symbol, held);
            }
        }

        Ok(())
    }
}
