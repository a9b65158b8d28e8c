use super::price_cache::PriceCache;
use super::prices_errors::PriceError;
use super::prices_model::{
    normalize_symbol, CurrencyRecord, Mutation, MutationReply, PriceChange, PriceOperation,
};
use super::prices_traits::{PriceRepositoryTrait, PriceServiceTrait};
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns the price cache and serializes every write against it.
///
/// Writers hold `write_lock` from the existence check until the cache has
/// been reloaded from the store. Readers go straight to the cache.
pub struct PriceService {
    repository: Arc<dyn PriceRepositoryTrait>,
    cache: PriceCache,
    write_lock: Mutex<()>,
}

impl PriceService {
    pub fn new(repository: Arc<dyn PriceRepositoryTrait>) -> Self {
        Self {
            repository,
            cache: PriceCache::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// Reload used inside the pipeline. A failure leaves the previous
    /// snapshot in place and is only logged.
    fn reload_after(&self, operation: PriceOperation) {
        if let Err(e) = self.reload() {
            log::warn!("{} reload failed, cache kept: {}", operation, e);
        }
    }
}

#[async_trait]
impl PriceServiceTrait for PriceService {
    fn initialize(&self) -> Result<usize> {
        let count = self.reload()?;
        log::info!("Loaded {} currency prices into cache", count);
        Ok(count)
    }

    fn reload(&self) -> Result<usize> {
        let prices = self.repository.load_prices()?;
        Ok(self.cache.replace(prices))
    }

    async fn refresh(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        self.reload()
    }

    fn get_price(&self, currency_type: &str) -> Option<CurrencyRecord> {
        self.cache.get(currency_type)
    }

    fn select_price(&self, currency_type: &str) -> Result<CurrencyRecord> {
        let symbol = normalize_symbol(currency_type);
        if symbol.is_empty() {
            return Err(PriceError::EmptySymbol(PriceOperation::Select).into());
        }
        self.cache
            .get(&symbol)
            .ok_or_else(|| PriceError::NotFound(symbol).into())
    }

    fn get_price_history(&self, currency_type: &str) -> Result<Vec<PriceChange>> {
        self.repository
            .load_price_changes(&normalize_symbol(currency_type))
    }

    async fn insert_price(&self, currency_type: &str, price: &str) -> Result<MutationReply> {
        let record = CurrencyRecord::parse(currency_type, price, PriceOperation::Insert)?;
        let symbol = record.currency_type.clone();

        let _guard = self.write_lock.lock().await;
        if self.cache.contains(&symbol) {
            return Err(PriceError::AlreadyExists(symbol).into());
        }

        let persisted = match self.repository.insert_price(record).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Insert {} failed: {}", symbol, e);
                false
            }
        };
        self.reload_after(PriceOperation::Insert);

        Ok(MutationReply::new(Mutation::Insert, symbol, persisted))
    }

    async fn update_price(&self, currency_type: &str, price: &str) -> Result<MutationReply> {
        let record = CurrencyRecord::parse(currency_type, price, PriceOperation::Update)?;
        let symbol = record.currency_type.clone();

        let _guard = self.write_lock.lock().await;
        if !self.cache.contains(&symbol) {
            return Err(PriceError::NotFoundForUpdate(symbol).into());
        }

        let persisted = match self.repository.update_price(record).await {
            Ok(change) => {
                log::debug!(
                    "Update {}: {} -> {}",
                    change.currency_type,
                    change.original_price,
                    change.new_price
                );
                true
            }
            Err(e) => {
                log::error!("Update {} failed: {}", symbol, e);
                false
            }
        };
        self.reload_after(PriceOperation::Update);

        Ok(MutationReply::new(Mutation::Update, symbol, persisted))
    }

    async fn delete_price(&self, currency_type: &str) -> Result<MutationReply> {
        let symbol = normalize_symbol(currency_type);

        let _guard = self.write_lock.lock().await;
        if !self.cache.contains(&symbol) {
            return Err(PriceError::NotFoundForDelete(symbol).into());
        }

        let persisted = match self.repository.delete_price(symbol.clone()).await {
            Ok(affected) => {
                log::debug!("Delete {} removed {} rows", symbol, affected);
                true
            }
            Err(e) => {
                log::error!("Delete {} failed: {}", symbol, e);
                false
            }
        };
        self.reload_after(PriceOperation::Delete);

        Ok(MutationReply::new(Mutation::Delete, symbol, persisted))
    }
}
