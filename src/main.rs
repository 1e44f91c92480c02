use anyhow::Context;
use papertrader::config::SimulatorConfig;
use papertrader::execution::TradeExecutor;
use papertrader::feed::BinanceClient;
use papertrader::sim::Simulator;
use papertrader::store::{PostgresStore, Store};
use papertrader::strategy::CrossoverStrategy;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    tracing::info!("🚀 Paper trader starting");

    let config = SimulatorConfig::from_env().context("invalid configuration")?;

    tracing::info!("📊 Configuration:");
    tracing::info!("  Symbols: {}", config.symbols.join(", "));
    tracing::info!("  Poll interval: {} min", config.poll_interval_minutes);
    tracing::info!(
        "  Crossover windows: {}/{}",
        config.short_window,
        config.long_window
    );
    tracing::info!(
        "  Position size: {}%",
        config.position_size_fraction * 100.0
    );
    tracing::info!("  Starting cash: {:.2}", config.starting_cash_balance);

    let store = Arc::new(
        PostgresStore::new(&config.database_url)
            .await
            .context("failed to connect to Postgres")?,
    );
    store
        .init_account(config.starting_cash_balance)
        .await
        .context("failed to initialize account")?;

    let strategy = CrossoverStrategy::new(config.short_window, config.long_window);
    let executor = TradeExecutor::new(store.clone(), config.position_size_fraction);
    let mut simulator = Simulator::new(
        BinanceClient::new(),
        store,
        strategy,
        executor,
        config.symbols.clone(),
    );

    // One cycle per tick; Skip means an overrunning cycle delays to the next
    // boundary instead of scheduling a negative sleep.
    let mut ticker = interval(Duration::from_secs(config.poll_interval_minutes * 60));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        "Fetching prices every {} minutes. Press Ctrl+C to stop...",
        config.poll_interval_minutes
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::info!("🔄 Tick at {}", chrono::Utc::now().format("%H:%M:%S"));
                if let Err(e) = simulator.run_cycle().await {
                    // Persistence failures surface here; keep polling, the
                    // next tick retries against the store.
                    tracing::error!("Cycle failed: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("⚠️  Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    tracing::info!("👋 Paper trader stopped");
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("papertrader=info,papertrader::strategy=debug")
        .init();
}
