use async_trait::async_trait;

use super::ServiceError;
use crate::model::{CustomerId, OrderId, PaymentIntent};

/// Inventory availability port.
///
/// `Ok(false)` is a definitive "not available"; `Err` means the answer is unknown.
#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn check_availability(&self, product_id: u64, quantity: u32) -> Result<bool, ServiceError>;
}

/// Notification port. Calls are always made off the response path.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_order_created(&self, order_id: OrderId) -> Result<(), ServiceError>;

    async fn send_status_update(
        &self,
        order_id: OrderId,
        customer_id: &CustomerId,
        status: &str,
    ) -> Result<(), ServiceError>;
}

/// Payment port: opens a payment intent for a persisted order.
#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_payment(
        &self,
        order_id: OrderId,
        customer_id: &CustomerId,
        amount: f64,
        currency: &str,
    ) -> Result<PaymentIntent, ServiceError>;
}
