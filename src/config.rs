use crate::{EngineError, Result};

/// Runtime configuration, read from the environment.
///
/// Defaults: BTCUSDT and ETHUSDT polled every five minutes, 5/20 crossover
/// windows, 5% position sizing, 10000 starting cash.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub symbols: Vec<String>,
    pub poll_interval_minutes: u64,
    pub short_window: usize,
    pub long_window: usize,
    pub position_size_fraction: f64,
    pub starting_cash_balance: f64,
    pub database_url: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            poll_interval_minutes: 5,
            short_window: 5,
            long_window: 20,
            position_size_fraction: 0.05,
            starting_cash_balance: 10000.0,
            database_url: "postgres://localhost/papertrader".to_string(),
        }
    }
}

impl SimulatorConfig {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let symbols = match std::env::var("SYMBOLS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.symbols,
        };

        let config = Self {
            symbols,
            poll_interval_minutes: parse_env("POLL_INTERVAL_MINUTES", defaults.poll_interval_minutes)?,
            short_window: parse_env("SHORT_WINDOW", defaults.short_window)?,
            long_window: parse_env("LONG_WINDOW", defaults.long_window)?,
            position_size_fraction: parse_env(
                "POSITION_SIZE_FRACTION",
                defaults.position_size_fraction,
            )?,
            starting_cash_balance: parse_env(
                "STARTING_CASH_BALANCE",
                defaults.starting_cash_balance,
            )?,
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(EngineError::Config("no symbols configured".to_string()));
        }
        if self.poll_interval_minutes == 0 {
            return Err(EngineError::Config(
                "poll interval must be positive".to_string(),
            ));
        }
        if self.short_window == 0 {
            return Err(EngineError::Config(
                "short window must be positive".to_string(),
            ));
        }
        if self.long_window <= self.short_window {
            return Err(EngineError::Config(format!(
                "long window ({}) must exceed short window ({})",
                self.long_window, self.short_window
            )));
        }
        if self.position_size_fraction <= 0.0 || self.position_size_fraction > 1.0 {
            return Err(EngineError::Config(format!(
                "position size fraction {} must be in (0, 1]",
                self.position_size_fraction
            )));
        }
        if self.starting_cash_balance < 0.0 {
            return Err(EngineError::Config(
                "starting cash balance must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| EngineError::Config(format!("could not parse {}={}", name, raw))),
        Err(_) => Ok(default),
    }
}
