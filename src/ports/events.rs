use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ServiceError;

/// Exchange/topic that order lifecycle events are published to.
pub const ORDERS_TOPIC: &str = "orders";
/// Routing key of the event emitted after an order is persisted.
pub const ORDER_CREATED_KEY: &str = "order.created";

/// A lifecycle event as handed to the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub topic: String,
    pub routing_key: String,
    pub payload: String,
}

/// Event publisher port. Delivery beyond "attempted once" is the broker's job.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, routing_key: &str, payload: String) -> Result<(), ServiceError>;
}
