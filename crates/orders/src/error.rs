//! Order placement failure taxonomy.

use thiserror::Error;

use pawmart_core::{DomainError, ProductId};

/// Why a `place_order` attempt was rejected.
///
/// Every kind except `CommitFailed` is a deterministic local rejection that
/// leaves all state untouched and is surfaced verbatim to the caller.
/// `CommitFailed` is the only kind that can originate from infrastructure;
/// it also guarantees full rollback, so retrying the whole placement is
/// safe for the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaceOrderError {
    /// The cart itself is malformed (empty, or a non-positive quantity).
    #[error("invalid cart: {0}")]
    InvalidCart(String),

    /// The shipping address does not exist or belongs to another account.
    #[error("shipping address not found for this account")]
    InvalidAddress,

    /// The payment method is not one of the accepted kinds.
    #[error("invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    /// The product does not exist or is no longer active.
    #[error("product unavailable: {0}")]
    ProductUnavailable(ProductId),

    /// Aggregated demand for a product exceeds its live stock.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The atomic commit did not complete; nothing was persisted.
    #[error("order commit failed: {0}")]
    CommitFailed(String),
}

impl PlaceOrderError {
    /// Only a failed commit is worth retrying from the caller's side; the
    /// rest are deterministic and will fail identically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlaceOrderError::CommitFailed(_))
    }
}

impl From<DomainError> for PlaceOrderError {
    fn from(value: DomainError) -> Self {
        // Domain-level arithmetic/validation failures during pricing are
        // cart problems from the caller's point of view.
        PlaceOrderError::InvalidCart(value.to_string())
    }
}
