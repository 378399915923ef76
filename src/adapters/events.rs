use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::ports::{EventPublisher, OrderEvent, ServiceError};

/// In-process event bus that fans order events out to subscribers.
///
/// Stands in for an external broker: publishing with no subscribers succeeds,
/// and slow subscribers may observe `Lagged`.
#[derive(Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<OrderEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, topic: &str, routing_key: &str, payload: String) -> Result<(), ServiceError> {
        let event = OrderEvent {
            topic: topic.to_string(),
            routing_key: routing_key.to_string(),
            payload,
        };
        match self.sender.send(event) {
            Ok(receivers) => debug!(topic, routing_key, receivers, "Event published"),
            Err(_) => debug!(topic, routing_key, "Event published with no subscribers"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ORDERS_TOPIC, ORDER_CREATED_KEY};

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let publisher = BroadcastPublisher::new(16);
        let mut events = publisher.subscribe();

        publisher
            .publish(ORDERS_TOPIC, ORDER_CREATED_KEY, r#"{"id":1}"#.into())
            .await
            .unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.topic, "orders");
        assert_eq!(event.routing_key, "order.created");
        assert_eq!(event.payload, r#"{"id":1}"#);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_succeeds() {
        let publisher = BroadcastPublisher::new(1);
        assert!(publisher.publish(ORDERS_TOPIC, ORDER_CREATED_KEY, "{}".into()).await.is_ok());
    }
}
