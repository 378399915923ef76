//! Stand-in payment gateway.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, instrument};

use crate::model::{to_cents, CustomerId, OrderId, PaymentIntent, INTENT_REQUIRES_PAYMENT_METHOD};
use crate::ports::{PaymentService, ServiceError};

/// Issues sequential `pi_stub_<n>` intents without talking to a real gateway.
#[derive(Debug, Default)]
pub struct StubPaymentGateway {
    issued: AtomicU64,
}

impl StubPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of intents issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PaymentService for StubPaymentGateway {
    #[instrument(skip(self, customer_id))]
    async fn create_payment(
        &self,
        order_id: OrderId,
        customer_id: &CustomerId,
        amount: f64,
        currency: &str,
    ) -> Result<PaymentIntent, ServiceError> {
        let currency = currency.trim().to_lowercase();
        if currency.is_empty() {
            return Err(ServiceError::Rejected("currency is required".into()));
        }
        let amount_cents = to_cents(amount);
        if !amount.is_finite() || amount_cents <= 0 {
            return Err(ServiceError::Rejected(format!("invalid amount: {amount}")));
        }

        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        let intent = PaymentIntent {
            id: format!("pi_stub_{n}"),
            order_id,
            customer_id: customer_id.clone(),
            amount_cents,
            currency,
            status: INTENT_REQUIRES_PAYMENT_METHOD.to_string(),
            client_secret: format!("secret_stub_{n}"),
        };
        info!(intent_id = %intent.id, amount_cents, "Payment intent created");
        Ok(intent)
    }
}
