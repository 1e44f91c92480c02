use super::Store;
use crate::models::{Fill, PriceObservation, Trade};
use crate::{EngineError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

struct Inner {
    /// Per-symbol time series keyed by timestamp; the map key gives the
    /// `(timestamp, symbol)` upsert semantics for free.
    prices: HashMap<String, BTreeMap<DateTime<Utc>, f64>>,
    cash: Option<f64>,
    holdings: HashMap<String, f64>,
    trades: Vec<Trade>,
    next_trade_id: i64,
}

/// In-process store with the same contract as the Postgres store.
///
/// Backs tests and ephemeral runs. A fill is applied under a single write
/// lock, so cash, holding and ledger never diverge.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                prices: HashMap::new(),
                cash: None,
                holdings: HashMap::new(),
                trades: Vec::new(),
                next_trade_id: 1,
            })),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| EngineError::Persistence(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| EngineError::Persistence(e.to_string()))
    }

    /// Number of stored observations for a symbol
    pub fn observation_count(&self, symbol: &str) -> Result<usize> {
        Ok(self.read()?.prices.get(symbol).map(|m| m.len()).unwrap_or(0))
    }

    /// True when a holdings row exists for the symbol, regardless of value
    pub fn has_holding_row(&self, symbol: &str) -> Result<bool> {
        Ok(self.read()?.holdings.contains_key(symbol))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn init_account(&self, starting_balance: f64) -> Result<()> {
        let mut inner = self.write()?;
        if inner.cash.is_none() {
            inner.cash = Some(starting_balance);
        }
        Ok(())
    }

    async fn record_price(&self, observation: &PriceObservation) -> Result<()> {
        let mut inner = self.write()?;
        inner
            .prices
            .entry(observation.symbol.clone())
            .or_default()
            .insert(observation.timestamp, observation.price);
        Ok(())
    }

    async fn recent_prices(&self, symbol: &str, count: usize) -> Result<Vec<f64>> {
        let inner = self.read()?;

        Ok(inner
            .prices
            .get(symbol)
            .map(|series| {
                let mut tail: Vec<f64> = series.values().rev().take(count).copied().collect();
                tail.reverse();
                tail
            })
            .unwrap_or_default())
    }

    async fn cash_balance(&self) -> Result<f64> {
        self.read()?.cash.ok_or_else(|| {
            EngineError::Persistence("account row missing; store not initialized".to_string())
        })
    }

    async fn holding(&self, symbol: &str) -> Result<f64> {
        Ok(self.read()?.holdings.get(symbol).copied().unwrap_or(0.0))
    }

    async fn commit_fill(&self, fill: &Fill) -> Result<Trade> {
        let mut inner = self.write()?;

        inner.cash = Some(fill.new_cash);

        if fill.new_holding == 0.0 {
            inner.holdings.remove(&fill.symbol);
        } else {
            inner
                .holdings
                .insert(fill.symbol.clone(), fill.new_holding);
        }

        let trade = Trade {
            id: inner.next_trade_id,
            timestamp: fill.timestamp,
            symbol: fill.symbol.clone(),
            action: fill.action,
            price: fill.price,
            quantity: fill.quantity,
            balance: fill.new_cash,
        };
        inner.next_trade_id += 1;
        inner.trades.push(trade.clone());

        Ok(trade)
    }

    async fn trades(&self) -> Result<Vec<Trade>> {
        Ok(self.read()?.trades.clone())
    }
}
