//! Payment intents returned by the payment port.

use serde::{Deserialize, Serialize};

use super::{CustomerId, OrderId};

/// Status of an intent that still needs a payment method attached.
pub const INTENT_REQUIRES_PAYMENT_METHOD: &str = "requires_payment_method";

/// A payment intent opened for a persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    /// Amount in the currency's minor unit.
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub client_secret: String,
}

/// Converts a decimal amount to minor units, rounding to the nearest cent.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
