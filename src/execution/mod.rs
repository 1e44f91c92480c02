// Trade execution module
pub mod executor;

pub use executor::{ExecutionOutcome, TradeExecutor, MIN_TRADE_NOTIONAL};
