//! Capability ports: the narrow interfaces the orchestrator depends on.
//!
//! Every collaborator (store, cache, broker, inventory, notification, payment,
//! metrics) is reached through one of these traits and injected into
//! [`OrderService`](crate::service::OrderService) at construction. Production
//! adapters live in [`crate::adapters`] and [`crate::clients`]; test doubles in
//! [`crate::adapters::mock`].

pub mod cache;
pub mod events;
pub mod metrics;
pub mod repository;
pub mod services;

pub use cache::*;
pub use events::*;
pub use metrics::*;
pub use repository::*;
pub use services::*;

use thiserror::Error;

/// Failure reported by an external capability port.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// Transport or service failure: the answer is unknown.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service answered and refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// A circuit breaker short-circuited the call.
    #[error("circuit open: {0}")]
    CircuitOpen(String),
}
