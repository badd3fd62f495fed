//! Domain error model.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures. Locking and storage
/// problems belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An unknown item, unit or reservation id was referenced.
    #[error("not found")]
    NotFound,

    /// A quantity was zero or negative where a positive one is required.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// The requested quantity exceeds the stock available at validation time.
    #[error("insufficient stock (requested: {requested}, available: {available})")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },

    /// A value failed validation (e.g. an empty name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Revenue or profit was requested but sales carry no price data.
    #[error("pricing data is not recorded on sales")]
    PricingUnavailable,
}

impl DomainError {
    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn insufficient_stock(requested: Decimal, available: Decimal) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_both_quantities() {
        let err = DomainError::insufficient_stock(Decimal::from(2), Decimal::from(1));
        assert_eq!(
            err.to_string(),
            "insufficient stock (requested: 2, available: 1)"
        );
    }
}
