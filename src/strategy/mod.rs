// Trading strategy module
pub mod crossover;

pub use crossover::CrossoverStrategy;

use crate::models::Signal;

/// Base trait for all trading strategies
///
/// `evaluate` is a pure function of the supplied price window: no hidden
/// state, fully deterministic. Insufficient history is `Signal::Hold`, not
/// an error, so callers never have to unwind a normal warm-up phase.
pub trait Strategy: Send + Sync {
    /// Generate a trading signal from a chronological (oldest-first) price
    /// window for one symbol
    fn evaluate(&self, prices: &[f64]) -> Signal;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Number of prices the strategy needs before it can emit a non-Hold
    /// signal. Callers use this as the window length to read from history.
    fn min_prices_required(&self) -> usize;
}
