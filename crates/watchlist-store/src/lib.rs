use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Durable set of watched ticker symbols.
///
/// Symbols are uppercased before every operation and the symbol column is
/// the primary key, so `add` and `remove` are both idempotent. Each
/// operation acquires a connection from the pool for its own scope; no
/// transaction spans two logical operations.
#[derive(Clone)]
pub struct WatchlistDb {
    pool: SqlitePool,
}

impl WatchlistDb {
    /// Open (creating if missing) the database and apply the schema.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // One connection, checked out and back per operation. Also keeps
        // `sqlite::memory:` coherent — every pooled connection would
        // otherwise get its own empty in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;

        Ok(db)
    }

    async fn init_schema(&self) -> Result<()> {
        let schema = include_str!("../../../schema.sql");

        // sqlx executes one statement at a time, so split on ';'.
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a symbol; re-adding an existing one is a silent no-op.
    pub async fn add(&self, symbol: &str) -> Result<()> {
        let symbol = symbol.trim().to_uppercase();

        sqlx::query("INSERT OR IGNORE INTO watchlist (symbol) VALUES (?)")
            .bind(&symbol)
            .execute(&self.pool)
            .await?;

        tracing::debug!(%symbol, "watchlist add");
        Ok(())
    }

    /// Delete a symbol; removing one that is not present is a no-op.
    pub async fn remove(&self, symbol: &str) -> Result<()> {
        let symbol = symbol.trim().to_uppercase();

        sqlx::query("DELETE FROM watchlist WHERE symbol = ?")
            .bind(&symbol)
            .execute(&self.pool)
            .await?;

        tracing::debug!(%symbol, "watchlist remove");
        Ok(())
    }

    /// All saved symbols, ordered alphabetically.
    pub async fn list(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT symbol FROM watchlist ORDER BY symbol")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(symbol,)| symbol).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_is_idempotent_and_uppercases() {
        let db = WatchlistDb::new("sqlite::memory:").await.unwrap();

        db.add("aapl").await.unwrap();
        db.add("AAPL").await.unwrap();
        db.add(" aapl ").await.unwrap();

        assert_eq!(db.list().await.unwrap(), vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn remove_missing_symbol_is_a_noop() {
        let db = WatchlistDb::new("sqlite::memory:").await.unwrap();

        db.add("MSFT").await.unwrap();
        db.remove("TSLA").await.unwrap();
        db.remove("msft").await.unwrap();
        db.remove("MSFT").await.unwrap();

        assert!(db.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let db = WatchlistDb::new("sqlite::memory:").await.unwrap();

        db.add("TSLA").await.unwrap();
        db.add("AAPL").await.unwrap();
        db.add("MSFT").await.unwrap();

        assert_eq!(
            db.list().await.unwrap(),
            vec!["AAPL".to_string(), "MSFT".to_string(), "TSLA".to_string()]
        );
    }
}
