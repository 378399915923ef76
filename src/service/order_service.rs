use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::auth::Caller;
use super::background::BackgroundTasks;
use crate::model::{
    is_terminal_status, CustomerId, NewOrder, Order, OrderCreate, OrderCreateWithPayment, OrderId,
    OrderPatch, OrderReplace, OrderWithPayment, PaymentOutcome, StatusChange,
};
use crate::order_actor::OrderError;
use crate::ports::{
    order_cache_key, EventPublisher, InventoryService, NotificationService, OrderCache, OrderMetrics,
    OrderRepository, PaymentService, ORDERS_TOPIC, ORDER_CREATED_KEY,
};

/// Every collaborator the orchestrator talks to.
#[derive(Clone)]
pub struct Ports {
    pub repository: Arc<dyn OrderRepository>,
    pub cache: Arc<dyn OrderCache>,
    pub publisher: Arc<dyn EventPublisher>,
    pub inventory: Arc<dyn InventoryService>,
    pub notifier: Arc<dyn NotificationService>,
    pub payment: Arc<dyn PaymentService>,
    pub metrics: Arc<dyn OrderMetrics>,
}

/// Tunables of the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub cache_ttl: Duration,
    pub batch_workers: usize,
    pub batch_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30 * 60),
            batch_workers: 10,
            batch_timeout: Duration::from_secs(30),
        }
    }
}

/// Order orchestrator. Cheap to clone; clones share every port.
#[derive(Clone)]
pub struct OrderService {
    pub(super) ports: Ports,
    pub(super) settings: ServiceSettings,
    background: BackgroundTasks,
}

impl OrderService {
    pub fn new(ports: Ports, settings: ServiceSettings, background: BackgroundTasks) -> Self {
        Self {
            ports,
            settings,
            background,
        }
    }

    pub fn background(&self) -> &BackgroundTasks {
        &self.background
    }

    /// Creates a pending order owned by the caller.
    #[instrument(skip(self, request, caller), fields(caller = ?caller.id))]
    pub async fn create_order(&self, request: OrderCreate, caller: &Caller) -> Result<Order, OrderError> {
        debug!(?request, "create_order called");
        let pending = self.admit(&request, caller).await?;
        let order = self.persist(pending).await?;
        self.announce_created(&order);
        Ok(order)
    }

    /// Creates an order and opens a payment intent for it.
    ///
    /// The order stays persisted when the payment call fails; the failure is
    /// returned in [`PaymentOutcome::PaymentError`].
    #[instrument(skip(self, request, caller), fields(caller = ?caller.id))]
    pub async fn create_order_with_payment(
        &self,
        request: OrderCreateWithPayment,
        caller: &Caller,
    ) -> Result<OrderWithPayment, OrderError> {
        debug!(?request, "create_order_with_payment called");
        caller.identity()?;
        request.validate()?;
        let pending = self.admit(&request.order, caller).await?;
        let order = self.persist(pending).await?;

        let payment = match self
            .ports
            .payment
            .create_payment(order.id, &order.customer_id, order.total_price, &request.currency)
            .await
        {
            Ok(intent) => {
                self.announce_created(&order);
                PaymentOutcome::Payment(intent)
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Payment intent failed; order kept");
                PaymentOutcome::PaymentError(format!("Failed to create payment intent: {e}"))
            }
        };
        Ok(OrderWithPayment { order, payment })
    }

    /// Every stored order, unpaginated.
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        self.ports.repository.list().await
    }

    /// Reads through the cache. Cached entries are served until they expire.
    #[instrument(skip(self, caller), fields(caller = ?caller.id))]
    pub async fn get_order(&self, id: &str, caller: &Caller) -> Result<Order, OrderError> {
        caller.identity()?;
        let id: OrderId = id.parse()?;
        let order = self.cached_order(id).await?;
        caller.authorize(&order)?;
        Ok(order)
    }

    /// Replaces the mutable fields of an order. The owner never changes.
    #[instrument(skip(self, patch, caller), fields(caller = ?caller.id))]
    pub async fn update_order(&self, id: &str, patch: OrderPatch, caller: &Caller) -> Result<Order, OrderError> {
        caller.identity()?;
        let id: OrderId = id.parse()?;
        patch.validate()?;
        let existing = self.load(id).await?;
        caller.authorize(&existing)?;

        if let Some(requested) = &patch.customer_id {
            if *requested != existing.customer_id {
                return Err(OrderError::Forbidden("order owner cannot be reassigned".into()));
            }
        }

        let updated = self
            .ports
            .repository
            .replace(
                id,
                OrderReplace {
                    customer_id: existing.customer_id.clone(),
                    product_id: patch.product_id,
                    quantity: patch.quantity,
                    total_price: patch.total_price,
                    status: patch.status,
                },
            )
            .await?;

        if updated.status != existing.status {
            self.notify_status(updated.id, updated.customer_id.clone(), updated.status.clone());
        }
        info!(order_id = %id, "Order updated");
        Ok(updated)
    }

    /// Deletes an order and announces it as cancelled.
    #[instrument(skip(self, caller), fields(caller = ?caller.id))]
    pub async fn delete_order(&self, id: &str, caller: &Caller) -> Result<Order, OrderError> {
        caller.identity()?;
        let id: OrderId = id.parse()?;
        let existing = self.load(id).await?;
        caller.authorize(&existing)?;

        let removed = self.ports.repository.delete(id).await?;
        self.notify_status(removed.id, removed.customer_id.clone(), "cancelled".to_string());
        info!(order_id = %id, "Order deleted");
        Ok(removed)
    }

    /// Status-only update.
    ///
    /// Counts the transition, decrements the active gauge whenever the new status
    /// is terminal, and notifies the owner when the status actually changed.
    #[instrument(skip(self, caller), fields(caller = ?caller.id))]
    pub async fn update_order_status(
        &self,
        id: &str,
        status: &str,
        caller: &Caller,
    ) -> Result<StatusChange, OrderError> {
        caller.identity()?;
        let id: OrderId = id.parse()?;
        let status = status.trim();
        if status.is_empty() {
            return Err(OrderError::Validation("status is required".into()));
        }
        let existing = self.load(id).await?;
        caller.authorize(&existing)?;

        let previous = self.ports.repository.set_status(id, status.to_string()).await?;

        self.ports.metrics.status_transition(status);
        if is_terminal_status(status) {
            self.ports.metrics.order_closed();
        }
        if previous != status {
            self.notify_status(id, existing.customer_id.clone(), status.to_string());
        }
        info!(order_id = %id, from = %previous, to = status, "Order status updated");

        Ok(StatusChange {
            order_id: id,
            previous_status: previous,
            status: status.to_string(),
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Identity, validation, ownership and inventory: everything that must pass
    /// before an order is written.
    async fn admit(&self, request: &OrderCreate, caller: &Caller) -> Result<NewOrder, OrderError> {
        let identity = caller.identity()?;
        request.validate()?;

        let owner = match &request.customer_id {
            Some(requested) if requested.as_str() != identity => {
                return Err(OrderError::Forbidden("cannot create order for another user".into()));
            }
            Some(requested) => requested.clone(),
            None => CustomerId::new(identity),
        };

        let available = self
            .ports
            .inventory
            .check_availability(request.product_id, request.quantity)
            .await
            .map_err(|e| OrderError::DependencyUnavailable(format!("Failed to check inventory: {e}")))?;
        if !available {
            return Err(OrderError::Validation(
                "Product not available in requested quantity".into(),
            ));
        }

        Ok(NewOrder::pending(owner, request))
    }

    async fn persist(&self, pending: NewOrder) -> Result<Order, OrderError> {
        let order = self.ports.repository.insert(pending).await?;
        self.ports.metrics.order_created();
        info!(order_id = %order.id, customer_id = %order.customer_id, "Order created");
        Ok(order)
    }

    async fn load(&self, id: OrderId) -> Result<Order, OrderError> {
        self.ports
            .repository
            .get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    async fn cached_order(&self, id: OrderId) -> Result<Order, OrderError> {
        let repository = self.ports.repository.clone();
        let loader = async move {
            let order = repository
                .get(id)
                .await?
                .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
            serde_json::to_string(&order)
                .map_err(|e| OrderError::DependencyUnavailable(format!("cache encode: {e}")))
        }
        .boxed();

        let raw = self
            .ports
            .cache
            .get_or_set(&order_cache_key(id), self.settings.cache_ttl, loader)
            .await?;
        serde_json::from_str(&raw)
            .map_err(|e| OrderError::DependencyUnavailable(format!("cache decode: {e}")))
    }

    /// Publishes the created event and notifies, both off the response path.
    fn announce_created(&self, order: &Order) {
        let order_id = order.id;
        match serde_json::to_string(order) {
            Ok(payload) => {
                let publisher = self.ports.publisher.clone();
                self.background.spawn("publish_order_created", async move {
                    if let Err(e) = publisher.publish(ORDERS_TOPIC, ORDER_CREATED_KEY, payload).await {
                        warn!(%order_id, error = %e, "Failed to publish order created event");
                    }
                });
            }
            Err(e) => warn!(%order_id, error = %e, "Failed to encode order created event"),
        }

        let notifier = self.ports.notifier.clone();
        self.background.spawn("notify_order_created", async move {
            if let Err(e) = notifier.send_order_created(order_id).await {
                warn!(%order_id, error = %e, "Failed to send order notification");
            }
        });
    }

    fn notify_status(&self, order_id: OrderId, customer_id: CustomerId, status: String) {
        let notifier = self.ports.notifier.clone();
        self.background.spawn("notify_status_update", async move {
            if let Err(e) = notifier.send_status_update(order_id, &customer_id, &status).await {
                warn!(%order_id, %status, error = %e, "Failed to send status update notification");
            }
        });
    }
}
