//! Startup, wiring and shutdown of the running system.

pub mod config;
pub mod order_system;
pub mod tracing;

pub use config::OrchestratorConfig;
pub use order_system::OrderSystem;
