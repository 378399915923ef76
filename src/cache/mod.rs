//! Read-through caching of serialized orders.
//!
//! [`InMemoryCache`] implements the [`OrderCache`](crate::ports::OrderCache) port
//! with per-entry TTLs and single-flight population.

pub mod memory;

pub use memory::InMemoryCache;
