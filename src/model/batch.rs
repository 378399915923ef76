//! Result shapes returned to callers: batch summaries and partial-success payloads.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Order, OrderId, PaymentIntent};

/// One batch item that did not produce an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedItem {
    /// Position of the item in the submitted batch.
    pub item: usize,
    pub error: String,
}

/// Outcome of a batch submission. Always returned as a success, even when
/// every item failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub failed_items: Vec<FailedItem>,
    /// Orders created by the batch, in submission order.
    pub created: Vec<Order>,
    #[serde(with = "duration_millis")]
    pub elapsed_time: Duration,
}

impl BatchSummary {
    pub fn is_partial_failure(&self) -> bool {
        self.failed > 0
    }
}

/// Payment half of a create-with-payment response.
///
/// Serialized flat next to the order, so callers see either a `payment` or a
/// `payment_error` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Payment(PaymentIntent),
    PaymentError(String),
}

/// Response of create-with-payment: the order is persisted either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithPayment {
    pub order: Order,
    #[serde(flatten)]
    pub payment: PaymentOutcome,
}

impl OrderWithPayment {
    pub fn payment_intent(&self) -> Option<&PaymentIntent> {
        match &self.payment {
            PaymentOutcome::Payment(intent) => Some(intent),
            PaymentOutcome::PaymentError(_) => None,
        }
    }

    pub fn payment_error(&self) -> Option<&str> {
        match &self.payment {
            PaymentOutcome::Payment(_) => None,
            PaymentOutcome::PaymentError(e) => Some(e),
        }
    }
}

/// Response of a status-only update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub order_id: OrderId,
    pub previous_status: String,
    pub status: String,
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomerId, NewOrder, OrderCreate};

    fn sample_order() -> Order {
        Order::new(OrderId(1), NewOrder::pending(CustomerId::new("7"), &OrderCreate::new(1, 2, 10.0)))
    }

    #[test]
    fn test_payment_error_is_flattened_next_to_order() {
        let response = OrderWithPayment {
            order: sample_order(),
            payment: PaymentOutcome::PaymentError("gateway down".into()),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["payment_error"], "gateway down");
        assert_eq!(json["order"]["customer_id"], "7");
        assert!(json.get("payment").is_none());
    }

    #[test]
    fn test_batch_summary_reports_elapsed_millis() {
        let summary = BatchSummary {
            total: 2,
            successful: 1,
            failed: 1,
            failed_items: vec![FailedItem { item: 1, error: "boom".into() }],
            created: vec![sample_order()],
            elapsed_time: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["elapsed_time"], 1500);
        assert_eq!(json["failed_items"][0]["item"], 1);
        assert!(summary.is_partial_failure());
    }
}
