//! Production adapters for the capability ports.
//!
//! The store and inventory adapters live in [`crate::clients`]; the rest are here.
//! [`mock`] holds the scriptable doubles used by tests.

pub mod breaker;
pub mod events;
pub mod mock;
pub mod notifier;
pub mod payment;

pub use breaker::{CircuitBreaker, CircuitState, GuardedInventory};
pub use events::BroadcastPublisher;
pub use notifier::LogNotifier;
pub use payment::StubPaymentGateway;
