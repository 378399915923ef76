//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).
//!
//! [`OrderClient`] is the persistence adapter and [`ProductClient`] the
//! in-process inventory adapter.

pub mod actor_client;
pub mod order_client;
pub mod product_client;

pub use actor_client::ActorClient;
pub use order_client::*;
pub use product_client::*;
