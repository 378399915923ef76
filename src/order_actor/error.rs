//! Error types for order operations.

use thiserror::Error;

use crate::framework::FrameworkError;

/// Errors surfaced by the order orchestrator.
///
/// The authorization variants are deliberately distinct: a caller can always
/// tell "who are you?" from "not yours" from "does not exist".
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// Malformed, missing, or semantically invalid input (including a
    /// definitive "not available" from inventory).
    #[error("Order validation error: {0}")]
    Validation(String),

    /// No caller identity was supplied.
    #[error("authentication required")]
    Unauthenticated,

    /// The caller is known but may not act on this order.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// A synchronous dependency (store, inventory, payment, cache) failed in transport.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

impl OrderError {
    /// Representative HTTP status for transport layers.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::Validation(_) => 400,
            OrderError::Unauthenticated => 401,
            OrderError::Forbidden(_) => 403,
            OrderError::NotFound(_) => 404,
            OrderError::DependencyUnavailable(_) => 503,
        }
    }
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(order_error) => *order_error,
                Err(other) => OrderError::Validation(other.to_string()),
            },
            other => OrderError::DependencyUnavailable(other.to_string()),
        }
    }
}
