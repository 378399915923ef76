use async_trait::async_trait;
use tracing::info;

use crate::model::{CustomerId, OrderId};
use crate::ports::{NotificationService, ServiceError};

/// Notification adapter that records each notification as a log line.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationService for LogNotifier {
    async fn send_order_created(&self, order_id: OrderId) -> Result<(), ServiceError> {
        info!(%order_id, "Notification: order created");
        Ok(())
    }

    async fn send_status_update(
        &self,
        order_id: OrderId,
        customer_id: &CustomerId,
        status: &str,
    ) -> Result<(), ServiceError> {
        info!(%order_id, %customer_id, status, "Notification: status update");
        Ok(())
    }
}
