use thiserror::Error;

/// Failure taxonomy for the simulation engine.
///
/// Two conditions are deliberately NOT errors: insufficient price history
/// (the detector returns `Signal::Hold`) and a buy below the minimum trade
/// size (the executor reports a skip outcome).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The price feed could not produce a quote this tick. Transient: the
    /// cycle skips the symbol and the next tick retries.
    #[error("price feed unavailable: {0}")]
    FeedUnavailable(String),

    /// The persistence substrate failed. Fatal for the current tick's write;
    /// propagated to the cycle driver rather than swallowed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Invalid or missing configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<sqlx::Error> for EngineError {
    fn from(e: sqlx::Error) -> Self {
        EngineError::Persistence(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for EngineError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        EngineError::Persistence(e.to_string())
    }
}
