use pricekeeper_core::prices::{CurrencyRecord, PriceChange, PriceRepositoryTrait};
use pricekeeper_core::Result;

use super::model::{CurrencyInfoDB, CurrencyLogDB, NewCurrencyInfoDB, NewCurrencyLogDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{currency_info, currency_log};
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use std::collections::HashMap;
use std::sync::Arc;

pub struct PriceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PriceRepository { pool, writer }
    }

    fn load_prices_impl(&self) -> Result<HashMap<String, CurrencyRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = currency_info::table
            .order(currency_info::id.asc())
            .select(CurrencyInfoDB::as_select())
            .load::<CurrencyInfoDB>(&mut conn)
            .map_err(StorageError::from)?;

        // Later rows win if a symbol was ever stored twice.
        Ok(rows
            .into_iter()
            .map(|row| (row.currency_type.clone(), CurrencyRecord::from(row)))
            .collect())
    }

    fn load_price_changes_impl(&self, symbol: &str) -> Result<Vec<PriceChange>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = currency_log::table
            .filter(currency_log::currency_type.eq(symbol))
            .order(currency_log::id.asc())
            .select(CurrencyLogDB::as_select())
            .load::<CurrencyLogDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PriceChange::from).collect())
    }
}

#[async_trait]
impl PriceRepositoryTrait for PriceRepository {
    fn load_prices(&self) -> Result<HashMap<String, CurrencyRecord>> {
        self.load_prices_impl().inspect_err(|e| log::error!("LoadAll failed: {}", e))
    }

    fn load_price_changes(&self, symbol: &str) -> Result<Vec<PriceChange>> {
        self.load_price_changes_impl(symbol)
            .inspect_err(|e| log::error!("LoadChanges {} failed: {}", symbol, e))
    }

    async fn insert_price(&self, record: CurrencyRecord) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let new_row = NewCurrencyInfoDB::from_record(record, Utc::now().naive_utc());
                let row = diesel::insert_into(currency_info::table)
                    .values(&new_row)
                    .returning(CurrencyInfoDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                log::debug!("Insert {} id: {}", row.currency_type, row.id);
                Ok(())
            })
            .await
    }

    async fn update_price(&self, record: CurrencyRecord) -> Result<PriceChange> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PriceChange> {
                let now = Utc::now().naive_utc();

                let original_price = currency_info::table
                    .filter(currency_info::currency_type.eq(&record.currency_type))
                    .order(currency_info::id.desc())
                    .select(currency_info::currency_price)
                    .first::<String>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .unwrap_or_default();

                let affected = diesel::update(
                    currency_info::table
                        .filter(currency_info::currency_type.eq(&record.currency_type)),
                )
                .set((
                    currency_info::currency_price.eq(&record.currency_price),
                    currency_info::update_datetime.eq(now),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                log::debug!("Update {} affected rows: {}", record.currency_type, affected);

                let entry = NewCurrencyLogDB {
                    currency_type: record.currency_type,
                    original_price,
                    new_price: record.currency_price,
                    create_datetime: now,
                };
                let logged = diesel::insert_into(currency_log::table)
                    .values(&entry)
                    .returning(CurrencyLogDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;

                Ok(PriceChange::from(logged))
            })
            .await
    }

    async fn delete_price(&self, symbol: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let affected = diesel::delete(
                    currency_info::table.filter(currency_info::currency_type.eq(&symbol)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                log::debug!("Delete {} affected rows: {}", symbol, affected);
                Ok(affected)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, create_schema, init, write_actor::spawn_writer};
    use tempfile::{tempdir, TempDir};

    fn record(symbol: &str, price: &str) -> CurrencyRecord {
        CurrencyRecord::from_store(symbol.to_string(), price.to_string())
    }

    async fn setup() -> (TempDir, PriceRepository) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.db");
        let db_path = init(path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        create_schema(&pool).unwrap();
        let writer = spawn_writer((*pool).clone()).unwrap();
        (dir, PriceRepository::new(pool, writer))
    }

    #[tokio::test]
    async fn insert_then_load_all() {
        let (_dir, repo) = setup().await;
        repo.insert_price(record("ETH", "1234.5")).await.unwrap();
        repo.insert_price(record("BTC", "65000")).await.unwrap();

        let prices = repo.load_prices().unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices["ETH"].currency_price, "1234.5");
        assert_eq!(prices["BTC"].currency_price, "65000");
    }

    #[tokio::test]
    async fn update_overwrites_price_and_appends_log() {
        let (_dir, repo) = setup().await;
        repo.insert_price(record("ETH", "1234.5")).await.unwrap();

        let change = repo.update_price(record("ETH", "1300")).await.unwrap();
        assert_eq!(change.currency_type, "ETH");
        assert_eq!(change.original_price, "1234.5");
        assert_eq!(change.new_price, "1300");

        repo.update_price(record("ETH", "1400")).await.unwrap();

        assert_eq!(repo.load_prices().unwrap()["ETH"].currency_price, "1400");
        let history = repo.load_price_changes("ETH").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].original_price, "1300");
        assert_eq!(history[1].new_price, "1400");
        assert!(history[0].id < history[1].id);
    }

    #[tokio::test]
    async fn delete_removes_row_but_keeps_log() {
        let (_dir, repo) = setup().await;
        repo.insert_price(record("ETH", "1")).await.unwrap();
        repo.update_price(record("ETH", "2")).await.unwrap();

        assert_eq!(repo.delete_price("ETH".to_string()).await.unwrap(), 1);
        assert_eq!(repo.delete_price("ETH".to_string()).await.unwrap(), 0);

        assert!(repo.load_prices().unwrap().is_empty());
        assert_eq!(repo.load_price_changes("ETH").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn latest_row_wins_for_duplicate_symbols() {
        let (_dir, repo) = setup().await;
        repo.insert_price(record("SOL", "100")).await.unwrap();
        repo.insert_price(record("SOL", "150")).await.unwrap();

        let prices = repo.load_prices().unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices["SOL"].currency_price, "150");
    }

    #[tokio::test]
    async fn create_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("prices.db");
        let db_path = init(path.to_str().unwrap()).unwrap();
        assert!(path.exists());

        let pool = create_pool(&db_path).unwrap();
        create_schema(&pool).unwrap();
        let writer = spawn_writer((*pool).clone()).unwrap();
        let repo = PriceRepository::new(pool.clone(), writer);
        repo.insert_price(record("ADA", "0.45")).await.unwrap();

        create_schema(&pool).unwrap();
        assert_eq!(repo.load_prices().unwrap()["ADA"].currency_price, "0.45");
    }

    #[tokio::test]
    async fn load_failures_are_reported() {
        let (_dir, repo) = setup().await;
        diesel::sql_query("DROP TABLE currency_log")
            .execute(&mut get_connection(&repo.pool).unwrap())
            .unwrap();

        assert!(repo.load_price_changes("ETH").is_err());
        assert!(repo.load_prices().is_ok());
    }

    #[tokio::test]
    async fn update_of_unknown_symbol_logs_empty_original() {
        let (_dir, repo) = setup().await;
        let change = repo.update_price(record("XRP", "0.5")).await.unwrap();
        assert_eq!(change.original_price, "");
        assert!(repo.load_prices().unwrap().is_empty());
    }
}
