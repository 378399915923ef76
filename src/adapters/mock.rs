//! # Test Doubles
//!
//! Scriptable implementations of every capability port. Each double is cheap to
//! clone and clones share state, so a test can hand one clone to
//! [`OrderService`](crate::service::OrderService) and keep another to script
//! failures and inspect what was called.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::model::{to_cents, CustomerId, NewOrder, Order, OrderId, OrderReplace, PaymentIntent};
use crate::order_actor::OrderError;
use crate::ports::{
    EventPublisher, InventoryService, NotificationService, OrderEvent, OrderRepository, PaymentService,
    ServiceError,
};

// =============================================================================
// INVENTORY
// =============================================================================

#[derive(Default)]
struct InventoryScript {
    fail_all: AtomicBool,
    failing: Mutex<HashSet<u64>>,
    unavailable: Mutex<HashSet<u64>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

/// Inventory that answers "available" unless told otherwise.
#[derive(Clone, Default)]
pub struct ScriptedInventory {
    script: Arc<InventoryScript>,
}

impl ScriptedInventory {
    pub fn available() -> Self {
        Self::default()
    }

    /// Every call fails with a transport error while set.
    pub fn fail_all(&self, fail: bool) {
        self.script.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Calls for `product_id` fail with a transport error.
    pub fn fail_product(&self, product_id: u64) {
        self.script.failing.lock().insert(product_id);
    }

    /// Calls for `product_id` answer "not available".
    pub fn set_unavailable(&self, product_id: u64) {
        self.script.unavailable.lock().insert(product_id);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.script.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryService for ScriptedInventory {
    async fn check_availability(&self, product_id: u64, _quantity: u32) -> Result<bool, ServiceError> {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.script.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.script.fail_all.load(Ordering::SeqCst) || self.script.failing.lock().contains(&product_id) {
            return Err(ServiceError::Unavailable("inventory unreachable".into()));
        }
        Ok(!self.script.unavailable.lock().contains(&product_id))
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// A notification as seen by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Created(OrderId),
    StatusUpdate {
        order_id: OrderId,
        customer_id: CustomerId,
        status: String,
    },
}

/// Notifier that records every call, and optionally fails it afterwards.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    /// Statuses sent for `order_id`, in call order.
    pub fn status_updates(&self, order_id: OrderId) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::StatusUpdate { order_id: id, status, .. } if *id == order_id => {
                    Some(status.clone())
                }
                _ => None,
            })
            .collect()
    }

    fn record(&self, notification: Notification) -> Result<(), ServiceError> {
        self.sent.lock().push(notification);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("notification service down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn send_order_created(&self, order_id: OrderId) -> Result<(), ServiceError> {
        self.record(Notification::Created(order_id))
    }

    async fn send_status_update(
        &self,
        order_id: OrderId,
        customer_id: &CustomerId,
        status: &str,
    ) -> Result<(), ServiceError> {
        self.record(Notification::StatusUpdate {
            order_id,
            customer_id: customer_id.clone(),
            status: status.to_string(),
        })
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Publisher that records every event, and optionally fails it afterwards.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<OrderEvent>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<OrderEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, routing_key: &str, payload: String) -> Result<(), ServiceError> {
        self.events.lock().push(OrderEvent {
            topic: topic.to_string(),
            routing_key: routing_key.to_string(),
            payload,
        });
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("broker down".into()));
        }
        Ok(())
    }
}

// =============================================================================
// PAYMENT
// =============================================================================

/// Payment port that succeeds with a fixed-format intent unless set to fail.
#[derive(Clone, Default)]
pub struct ScriptedPayment {
    failing: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedPayment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentService for ScriptedPayment {
    async fn create_payment(
        &self,
        order_id: OrderId,
        customer_id: &CustomerId,
        amount: f64,
        currency: &str,
    ) -> Result<PaymentIntent, ServiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("payment gateway unreachable".into()));
        }
        Ok(PaymentIntent {
            id: format!("pi_test_{n}"),
            order_id,
            customer_id: customer_id.clone(),
            amount_cents: to_cents(amount),
            currency: currency.to_string(),
            status: "requires_payment_method".into(),
            client_secret: format!("secret_test_{n}"),
        })
    }
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Repository wrapper that can be switched offline and counts reads.
///
/// While offline every call fails with [`OrderError::DependencyUnavailable`].
#[derive(Clone)]
pub struct SwitchableRepository {
    inner: Arc<dyn OrderRepository>,
    offline: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
}

impl SwitchableRepository {
    pub fn new(inner: Arc<dyn OrderRepository>) -> Self {
        Self {
            inner,
            offline: Arc::new(AtomicBool::new(false)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `get` calls that reached the wrapped store.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), OrderError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(OrderError::DependencyUnavailable("order store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for SwitchableRepository {
    async fn ping(&self) -> Result<(), OrderError> {
        self.check()?;
        self.inner.ping().await
    }

    async fn insert(&self, order: NewOrder) -> Result<Order, OrderError> {
        self.check()?;
        self.inner.insert(order).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id).await
    }

    async fn list(&self) -> Result<Vec<Order>, OrderError> {
        self.check()?;
        self.inner.list().await
    }

    async fn replace(&self, id: OrderId, replacement: OrderReplace) -> Result<Order, OrderError> {
        self.check()?;
        self.inner.replace(id, replacement).await
    }

    async fn set_status(&self, id: OrderId, status: String) -> Result<String, OrderError> {
        self.check()?;
        self.inner.set_status(id, status).await
    }

    async fn delete(&self, id: OrderId) -> Result<Order, OrderError> {
        self.check()?;
        self.inner.delete(id).await
    }
}
