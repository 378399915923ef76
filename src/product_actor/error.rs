//! Inventory failures.

use thiserror::Error;

use crate::framework::FrameworkError;
use crate::ports::ServiceError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// Zero-unit reservations and restocks are rejected.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// The inventory store could not be reached or answered out of protocol.
    #[error("Inventory store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<FrameworkError> for ProductError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<ProductError>() {
                Ok(product_error) => *product_error,
                Err(other) => ProductError::StoreUnavailable(other.to_string()),
            },
            other => ProductError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Business answers are `Rejected`; only transport trouble is `Unavailable`.
impl From<ProductError> for ServiceError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::StoreUnavailable(msg) => ServiceError::Unavailable(msg),
            other => ServiceError::Rejected(other.to_string()),
        }
    }
}
