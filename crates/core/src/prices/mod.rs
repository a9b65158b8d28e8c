//! Prices module - currency records, the in-memory price cache, and the
//! mutation pipeline that keeps the cache in step with storage.

mod price_cache;
mod prices_errors;
mod prices_model;
mod prices_service;
mod prices_traits;


pub use price_cache::PriceCache;
pub use prices_errors::PriceError;
pub use prices_model::{
    normalize_price, normalize_symbol, CurrencyRecord, Mutation, MutationReply, PriceChange, PriceOperation,
};
pub use prices_service::PriceService;
pub use prices_traits::{PriceRepositoryTrait, PriceServiceTrait};
