//! SQLite storage implementation for currency prices and their change log.

mod model;
mod repository;

pub use model::{CurrencyInfoDB, CurrencyLogDB, NewCurrencyInfoDB, NewCurrencyLogDB};
pub use repository::PriceRepository;
