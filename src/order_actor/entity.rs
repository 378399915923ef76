//! ActorEntity trait implementation for the Order domain type.
//!
//! This enables [`Order`] to be persisted by the generic
//! [`ResourceActor`](crate::framework::ResourceActor): creation stamps a store
//! assigned id, updates replace every mutable field, and the `SetStatus` action
//! performs the status-only partial update.

use async_trait::async_trait;

use super::{OrderAction, OrderError};
use crate::framework::ActorEntity;
use crate::model::{NewOrder, Order, OrderId, OrderReplace};

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = NewOrder;
    type Update = OrderReplace;
    type Action = OrderAction;
    type ActionResult = String;
    type Context = ();
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: NewOrder) -> Result<Self, Self::Error> {
        Ok(Order::new(id, params))
    }

    /// Replaces all mutable fields. `id` and `created_at` never change.
    async fn on_update(&mut self, update: OrderReplace, _ctx: &()) -> Result<(), Self::Error> {
        self.customer_id = update.customer_id;
        self.product_id = update.product_id;
        self.quantity = update.quantity;
        self.total_price = update.total_price;
        self.status = update.status;
        Ok(())
    }

    /// Returns the status the order had before the action ran.
    async fn handle_action(&mut self, action: OrderAction, _ctx: &()) -> Result<String, Self::Error> {
        match action {
            OrderAction::SetStatus(status) => Ok(std::mem::replace(&mut self.status, status)),
        }
    }
}
