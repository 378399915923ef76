//! The order orchestrator.
//!
//! [`OrderService`] composes the capability ports into the order operations:
//! authorization, synchronous dependency calls, detached side effects and
//! batch submission.

pub mod auth;
pub mod background;
mod batch;
pub mod order_service;

pub use auth::Caller;
pub use background::BackgroundTasks;
pub use order_service::{OrderService, Ports, ServiceSettings};
