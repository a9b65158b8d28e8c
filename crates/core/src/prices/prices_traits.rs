use super::prices_model::{CurrencyRecord, MutationReply, PriceChange};
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Trait defining the contract for the durable price store.
#[async_trait]
pub trait PriceRepositoryTrait: Send + Sync {
    /// Every current price keyed by symbol. Used to rebuild the cache.
    fn load_prices(&self) -> Result<HashMap<String, CurrencyRecord>>;
    /// Audit entries for one symbol, oldest first.
    fn load_price_changes(&self, currency_type: &str) -> Result<Vec<PriceChange>>;
    async fn insert_price(&self, record: CurrencyRecord) -> Result<()>;
    /// Overwrites the current price and appends one audit entry.
    async fn update_price(&self, record: CurrencyRecord) -> Result<PriceChange>;
    async fn delete_price(&self, currency_type: String) -> Result<usize>;
}

/// Trait defining the contract for price service operations.
#[async_trait]
pub trait PriceServiceTrait: Send + Sync {
    /// Loads the cache for the first time. Failure here is fatal to startup.
    fn initialize(&self) -> Result<usize>;
    /// Replaces the whole cache with the store's current contents.
    fn reload(&self) -> Result<usize>;
    /// Timer-driven reload, serialized with mutations.
    async fn refresh(&self) -> Result<usize>;

    fn get_price(&self, currency_type: &str) -> Option<CurrencyRecord>;
    fn select_price(&self, currency_type: &str) -> Result<CurrencyRecord>;
    fn get_price_history(&self, currency_type: &str) -> Result<Vec<PriceChange>>;

    async fn insert_price(&self, currency_type: &str, price: &str) -> Result<MutationReply>;
    async fn update_price(&self, currency_type: &str, price: &str) -> Result<MutationReply>;
    async fn delete_price(&self, currency_type: &str) -> Result<MutationReply>;
}
