use async_trait::async_trait;

use crate::model::{NewOrder, Order, OrderId, OrderReplace};
use crate::order_actor::OrderError;

/// Persistence port: stores and retrieves order records.
///
/// Transport failures surface as [`OrderError::DependencyUnavailable`];
/// writes against a missing id surface as [`OrderError::NotFound`].
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Connectivity probe.
    async fn ping(&self) -> Result<(), OrderError>;

    /// Persists a new order and returns it with its assigned id.
    async fn insert(&self, order: NewOrder) -> Result<Order, OrderError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError>;

    /// Every stored order, unpaginated.
    async fn list(&self) -> Result<Vec<Order>, OrderError>;

    /// Replaces all mutable fields and returns the stored result.
    async fn replace(&self, id: OrderId, replacement: OrderReplace) -> Result<Order, OrderError>;

    /// Overwrites the status and returns the previous one.
    async fn set_status(&self, id: OrderId, status: String) -> Result<String, OrderError>;

    /// Removes the order and returns its last state.
    async fn delete(&self, id: OrderId) -> Result<Order, OrderError>;
}
