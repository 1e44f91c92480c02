use super::Store;
use crate::models::{Fill, PriceObservation, Trade, TradeAction};
use crate::{EngineError, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

/// Postgres-backed store for account state, prices and trades
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to Postgres and run migrations
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Connected to Postgres at {}", database_url);

        Ok(Self { pool })
    }

    fn parse_action(action: &str) -> Result<TradeAction> {
        match action {
            "BUY" => Ok(TradeAction::Buy),
            "SELL" => Ok(TradeAction::Sell),
            other => Err(EngineError::Persistence(format!(
                "invalid trade action in ledger: {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn init_account(&self, starting_balance: f64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO account (id, balance)
            VALUES (1, $1)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(starting_balance)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_price(&self, observation: &PriceObservation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO prices (timestamp, symbol, price)
            VALUES ($1, $2, $3)
            ON CONFLICT (timestamp, symbol) DO UPDATE SET
                price = EXCLUDED.price
            "#,
        )
        .bind(observation.timestamp)
        .bind(&observation.symbol)
        .bind(observation.price)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            "Recorded {} @ {} for {}",
            observation.price,
            observation.timestamp,
            observation.symbol
        );

        Ok(())
    }

    async fn recent_prices(&self, symbol: &str, count: usize) -> Result<Vec<f64>> {
        let rows = sqlx::query(
            r#"
            SELECT price FROM prices
            WHERE symbol = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(symbol)
        .bind(count as i64)
        .fetch_all(&self.pool)
        .await?;

        // Query returns newest first; callers want chronological order.
        let mut prices: Vec<f64> = rows.iter().map(|row| row.get("price")).collect();
        prices.reverse();

        Ok(prices)
    }

    async fn cash_balance(&self) -> Result<f64> {
        let row = sqlx::query("SELECT balance FROM account WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.get("balance")),
            None => Err(EngineError::Persistence(
                "account row missing; store not initialized".to_string(),
            )),
        }
    }

    async fn holding(&self, symbol: &str) -> Result<f64> {
        let row = sqlx::query("SELECT quantity FROM holdings WHERE symbol = $1")
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("quantity")).unwrap_or(0.0))
    }

    async fn commit_fill(&self, fill: &Fill) -> Result<Trade> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE account SET balance = $1 WHERE id = 1")
            .bind(fill.new_cash)
            .execute(&mut *tx)
            .await?;

        if fill.new_holding == 0.0 {
            sqlx::query("DELETE FROM holdings WHERE symbol = $1")
                .bind(&fill.symbol)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO holdings (symbol, quantity)
                VALUES ($1, $2)
                ON CONFLICT (symbol) DO UPDATE SET
                    quantity = EXCLUDED.quantity
                "#,
            )
            .bind(&fill.symbol)
            .bind(fill.new_holding)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query(
            r#"
            INSERT INTO trades (timestamp, symbol, action, price, quantity, balance)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(fill.timestamp)
        .bind(&fill.symbol)
        .bind(fill.action.as_str())
        .bind(fill.price)
        .bind(fill.quantity)
        .bind(fill.new_cash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let id: i64 = row.get("id");

        tracing::debug!(
            "Committed trade {} ({} {} @ {})",
            id,
            fill.action.as_str(),
            fill.symbol,
            fill.price
        );

        Ok(Trade {
            id,
            timestamp: fill.timestamp,
            symbol: fill.symbol.clone(),
            action: fill.action,
            price: fill.price,
            quantity: fill.quantity,
            balance: fill.new_cash,
        })
    }

    async fn trades(&self) -> Result<Vec<Trade>> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, symbol, action, price, quantity, balance
            FROM trades
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut trades = Vec::new();

        for row in rows {
            let action: String = row.get("action");

            trades.push(Trade {
                id: row.get("id"),
                timestamp: row.get("timestamp"),
                symbol: row.get("symbol"),
                action: Self::parse_action(&action)?,
                price: row.get("price"),
                quantity: row.get("quantity"),
                balance: row.get("balance"),
            });
        }

        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn observation(symbol: &str, ts: chrono::DateTime<Utc>, price: f64) -> PriceObservation {
        PriceObservation {
            timestamp: ts,
            symbol: symbol.to_string(),
            price,
        }
    }

    async fn get_test_store() -> PostgresStore {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/papertrader_test".to_string());

        PostgresStore::new(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    async fn clear(store: &PostgresStore) {
        for table in ["prices", "trades", "holdings", "account"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&store.pool)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    #[ignore] // Requires Postgres running
    async fn test_init_account_is_idempotent() {
        let store = get_test_store().await;
        clear(&store).await;

        store.init_account(10000.0).await.unwrap();
        assert_eq!(store.cash_balance().await.unwrap(), 10000.0);

        // Re-initializing must not reset the balance.
        store.init_account(5000.0).await.unwrap();
        assert_eq!(store.cash_balance().await.unwrap(), 10000.0);

        clear(&store).await;
    }

    #[tokio::test]
    #[ignore] // Requires Postgres running
    async fn test_price_upsert_overwrites() {
        let store = get_test_store().await;
        clear(&store).await;

        let ts = Utc::now();
        store
            .record_price(&observation("BTCUSDT", ts, 45000.0))
            .await
            .unwrap();
        store
            .record_price(&observation("BTCUSDT", ts, 45500.0))
            .await
            .unwrap();

        let prices = store.recent_prices("BTCUSDT", 10).await.unwrap();
        assert_eq!(prices, vec![45500.0]);

        clear(&store).await;
    }

    #[tokio::test]
    #[ignore] // Requires Postgres running
    async fn test_recent_prices_chronological() {
        let store = get_test_store().await;
        clear(&store).await;

        let base = Utc::now();
        for i in 0..5 {
            let ts = base + chrono::Duration::minutes(i);
            store
                .record_price(&observation("ETHUSDT", ts, 2000.0 + i as f64))
                .await
                .unwrap();
        }

        let prices = store.recent_prices("ETHUSDT", 3).await.unwrap();
        assert_eq!(prices, vec![2002.0, 2003.0, 2004.0]);

        clear(&store).await;
    }

    #[tokio::test]
    #[ignore] // Requires Postgres running
    async fn test_commit_fill_roundtrip() {
        let store = get_test_store().await;
        clear(&store).await;
        store.init_account(10000.0).await.unwrap();

        let fill = Fill {
            timestamp: Utc::now(),
            symbol: "BTCUSDT".to_string(),
            action: TradeAction::Buy,
            price: 100.0,
            quantity: 5.0,
            new_cash: 9500.0,
            new_holding: 5.0,
        };

        let trade = store.commit_fill(&fill).await.unwrap();
        assert_eq!(trade.balance, 9500.0);

        assert_eq!(store.cash_balance().await.unwrap(), 9500.0);
        assert_eq!(store.holding("BTCUSDT").await.unwrap(), 5.0);

        let ledger = store.trades().await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].action, TradeAction::Buy);
        assert_eq!(ledger[0].quantity, 5.0);

        clear(&store).await;
    }

    #[tokio::test]
    #[ignore] // Requires Postgres running
    async fn test_zero_holding_row_is_removed() {
        let store = get_test_store().await;
        clear(&store).await;
        store.init_account(10000.0).await.unwrap();

        let buy = Fill {
            timestamp: Utc::now(),
            symbol: "BTCUSDT".to_string(),
            action: TradeAction::Buy,
            price: 100.0,
            quantity: 5.0,
            new_cash: 9500.0,
            new_holding: 5.0,
        };
        store.commit_fill(&buy).await.unwrap();

        let sell = Fill {
            timestamp: Utc::now(),
            symbol: "BTCUSDT".to_string(),
            action: TradeAction::Sell,
            price: 110.0,
            quantity: -5.0,
            new_cash: 10050.0,
            new_holding: 0.0,
        };
        store.commit_fill(&sell).await.unwrap();

        assert_eq!(store.holding("BTCUSDT").await.unwrap(), 0.0);

        let row = sqlx::query("SELECT COUNT(*) as count FROM holdings")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        let count: i64 = row.get("count");
        assert_eq!(count, 0);

        clear(&store).await;
    }
}
