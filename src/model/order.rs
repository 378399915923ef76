//! Order domain types.
//!
//! [`Order`] implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
//! allowing it to be persisted by a [`ResourceActor`](crate::framework::ResourceActor).
//!
//! See [`impl ActorEntity for Order`](crate::order_actor::entity) for details on:
//! - Creation parameters ([`NewOrder`])
//! - Update parameters ([`OrderReplace`])
//! - Custom actions ([`OrderAction`](crate::order_actor::OrderAction))

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::order_actor::OrderError;

/// Status assigned to every freshly persisted order.
pub const STATUS_PENDING: &str = "pending";
/// Terminal status: the order was fulfilled.
pub const STATUS_COMPLETED: &str = "completed";
/// Terminal status: the order was withdrawn.
pub const STATUS_CANCELLED: &str = "cancelled";

/// Returns true for statuses that end an order's active life.
pub fn is_terminal_status(status: &str) -> bool {
    status == STATUS_COMPLETED || status == STATUS_CANCELLED
}

/// Type-safe identifier for Orders, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = OrderError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<u32>()
            .ok()
            .filter(|id| *id > 0)
            .map(OrderId)
            .ok_or_else(|| OrderError::Validation(format!("Invalid ID: {raw:?}")))
    }
}

/// Owner of an order: the opaque caller id supplied by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub product_id: u64,
    pub quantity: u32,
    pub total_price: f64,
    /// Free-form; conventionally "pending" → "completed" / "cancelled".
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Inbound order-creation request.
///
/// `customer_id` is optional: when absent the caller becomes the owner, when
/// present it must match the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCreate {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub product_id: u64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub total_price: f64,
}

impl OrderCreate {
    pub fn new(product_id: u64, quantity: u32, total_price: f64) -> Self {
        Self {
            customer_id: None,
            product_id,
            quantity,
            total_price,
        }
    }

    /// Sets an explicit owner on the request.
    pub fn for_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(CustomerId::new(customer_id));
        self
    }

    /// Checks the fields every order needs.
    pub fn validate(&self) -> Result<(), OrderError> {
        validate_line(self.product_id, self.quantity, self.total_price)
    }
}

/// Inbound order-creation request that also opens a payment intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreateWithPayment {
    #[serde(flatten)]
    pub order: OrderCreate,
    pub currency: String,
}

impl OrderCreateWithPayment {
    pub fn validate(&self) -> Result<(), OrderError> {
        self.order.validate()?;
        if self.currency.trim().is_empty() {
            return Err(OrderError::Validation("currency is required".into()));
        }
        Ok(())
    }
}

/// Full replacement of an order's mutable fields.
///
/// `customer_id` may be omitted, in which case the existing owner is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub product_id: u64,
    pub quantity: u32,
    pub total_price: f64,
    pub status: String,
}

impl OrderPatch {
    pub fn validate(&self) -> Result<(), OrderError> {
        validate_line(self.product_id, self.quantity, self.total_price)
    }
}

/// Validated creation payload handed to the store. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub product_id: u64,
    pub quantity: u32,
    pub total_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// A pending order stamped with the current time.
    pub fn pending(customer_id: CustomerId, request: &OrderCreate) -> Self {
        Self {
            customer_id,
            product_id: request.product_id,
            quantity: request.quantity,
            total_price: request.total_price,
            status: STATUS_PENDING.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Replacement applied by the store to an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReplace {
    pub customer_id: CustomerId,
    pub product_id: u64,
    pub quantity: u32,
    pub total_price: f64,
    pub status: String,
}

impl Order {
    /// Builds an order from a store-assigned id and a validated payload.
    pub fn new(id: OrderId, params: NewOrder) -> Self {
        Self {
            id,
            customer_id: params.customer_id,
            product_id: params.product_id,
            quantity: params.quantity,
            total_price: params.total_price,
            status: params.status,
            created_at: params.created_at,
        }
    }

    /// Whether `customer` owns this order.
    pub fn is_owned_by(&self, customer: &str) -> bool {
        self.customer_id.as_str() == customer
    }
}

fn validate_line(product_id: u64, quantity: u32, total_price: f64) -> Result<(), OrderError> {
    if product_id == 0 {
        return Err(OrderError::Validation("product_id is required".into()));
    }
    if quantity == 0 {
        return Err(OrderError::Validation("quantity must be positive".into()));
    }
    if !total_price.is_finite() || total_price < 0.0 {
        return Err(OrderError::Validation(format!("invalid total_price: {total_price}")));
    }
    Ok(())
}
