use thiserror::Error;

use super::prices_model::PriceOperation;

/// Request outcomes that stop a price operation before it reaches storage.
///
/// The `Display` form of each variant is the reply text sent to the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("{0} currency is null or empty")]
    EmptySymbol(PriceOperation),

    #[error("{0} price is not number")]
    PriceNotNumber(PriceOperation),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("No {0} information")]
    NotFound(String),

    #[error("No {0} currency information for update")]
    NotFoundForUpdate(String),

    #[error("No {0} currency information for delete")]
    NotFoundForDelete(String),
}

impl PriceError {
    /// Malformed input: empty symbol or non-numeric price.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PriceError::EmptySymbol(_) | PriceError::PriceNotNumber(_)
        )
    }

    /// Existence-check mismatch against the cache.
    pub fn is_conflict(&self) -> bool {
        !self.is_validation()
    }
}
