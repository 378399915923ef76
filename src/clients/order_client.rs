//! # Order Client
//!
//! The persistence adapter: an [`OrderRepository`] backed by the order store actor.

use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{NewOrder, Order, OrderId, OrderReplace};
use crate::order_actor::{OrderAction, OrderError};
use crate::ports::OrderRepository;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Order store actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        OrderError::from(e)
    }
}

#[async_trait]
impl OrderRepository for OrderClient {
    async fn ping(&self) -> Result<(), OrderError> {
        let size = self.count().await?;
        debug!(size, "Order store reachable");
        Ok(())
    }

    #[instrument(skip(self, order), fields(customer_id = %order.customer_id))]
    async fn insert(&self, order: NewOrder) -> Result<Order, OrderError> {
        debug!(?order, "insert called");
        self.inner.create(order).await.map_err(Self::map_error)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        self.fetch(id).await
    }

    async fn list(&self) -> Result<Vec<Order>, OrderError> {
        self.fetch_all().await
    }

    #[instrument(skip(self, replacement))]
    async fn replace(&self, id: OrderId, replacement: OrderReplace) -> Result<Order, OrderError> {
        self.inner.update(id, replacement).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: OrderId, status: String) -> Result<String, OrderError> {
        self.inner
            .perform_action(id, OrderAction::SetStatus(status))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: OrderId) -> Result<Order, OrderError> {
        self.inner.delete(id).await.map_err(Self::map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_action, MockClient};
    use crate::model::{CustomerId, OrderCreate};

    fn stored(id: u32) -> Order {
        Order::new(OrderId(id), NewOrder::pending(CustomerId::new("7"), &OrderCreate::new(1, 2, 10.0)))
    }

    #[tokio::test]
    async fn test_set_status_sends_action_and_returns_previous() {
        let (client, mut receiver) = create_mock_client::<Order>(10);
        let orders = OrderClient::new(client);

        let task = tokio::spawn(async move { orders.set_status(OrderId(4), "completed".into()).await });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, OrderId(4));
        assert_eq!(action, OrderAction::SetStatus("completed".into()));
        responder.send(Ok("pending".into())).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), "pending");
    }

    #[tokio::test]
    async fn test_missing_record_maps_to_not_found() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_delete(OrderId(9))
            .return_err(FrameworkError::NotFound("9".into()));
        mock.expect_get(OrderId(1)).return_ok(Some(stored(1)));

        let orders = OrderClient::new(mock.client());
        assert_eq!(
            orders.delete(OrderId(9)).await,
            Err(OrderError::NotFound("9".into()))
        );
        assert_eq!(orders.get(OrderId(1)).await.unwrap(), Some(stored(1)));
        mock.verify();
    }

    #[tokio::test]
    async fn test_closed_store_is_dependency_unavailable() {
        let (client, receiver) = create_mock_client::<Order>(1);
        drop(receiver);
        let orders = OrderClient::new(client);
        assert!(matches!(orders.ping().await, Err(OrderError::DependencyUnavailable(_))));
        assert!(matches!(orders.list().await, Err(OrderError::DependencyUnavailable(_))));
    }
}
