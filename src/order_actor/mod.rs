//! Order-specific store logic and the orchestrator's error taxonomy.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::Order;

/// Custom actions for stored orders.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    /// Overwrites only the status field.
    SetStatus(String),
}

/// Creates a new Order store actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, OrderClient::new(generic_client))
}
