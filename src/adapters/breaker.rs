//! Failure isolation for the synchronous inventory call.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::ports::{InventoryService, ServiceError};

/// Observable breaker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
enum BreakerState {
    Closed { failures: u32 },
    Open { since: Instant },
    /// One probe call is allowed through.
    HalfOpen { probing: bool },
}

/// Consecutive-failure circuit breaker.
///
/// Opens after `failure_threshold` transport failures in a row, rejects calls
/// while open, and lets a single probe through once `reset_timeout` has passed.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_timeout: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
            state: Mutex::new(BreakerState::Closed { failures: 0 }),
        }
    }

    pub fn state(&self) -> CircuitState {
        match *self.state.lock() {
            BreakerState::Closed { .. } => CircuitState::Closed,
            BreakerState::Open { since } if since.elapsed() >= self.reset_timeout => CircuitState::HalfOpen,
            BreakerState::Open { .. } => CircuitState::Open,
            BreakerState::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Admits a call, or returns `None` while the circuit is open or a probe is
    /// already out. The returned permit must be settled with the call's outcome;
    /// a probe permit dropped unsettled re-opens the circuit.
    pub fn try_acquire(&self) -> Option<BreakerPermit<'_>> {
        let mut state = self.state.lock();
        let probe = match *state {
            BreakerState::Closed { .. } => false,
            BreakerState::Open { since } if since.elapsed() >= self.reset_timeout => true,
            BreakerState::Open { .. } => return None,
            BreakerState::HalfOpen { probing: true } => return None,
            BreakerState::HalfOpen { probing: false } => true,
        };
        if probe {
            *state = BreakerState::HalfOpen { probing: true };
        }
        Some(BreakerPermit {
            breaker: self,
            probe,
            settled: false,
        })
    }

    fn record_success(&self) {
        let mut state = self.state.lock();
        if !matches!(*state, BreakerState::Closed { failures: 0 }) {
            if matches!(*state, BreakerState::HalfOpen { .. }) {
                info!("Circuit closed");
            }
            *state = BreakerState::Closed { failures: 0 };
        }
    }

    fn record_failure(&self) {
        let mut state = self.state.lock();
        let next = match *state {
            BreakerState::Closed { failures } if failures + 1 < self.failure_threshold => {
                BreakerState::Closed { failures: failures + 1 }
            }
            BreakerState::Closed { failures } => {
                warn!(failures = failures + 1, "Circuit opened");
                BreakerState::Open { since: Instant::now() }
            }
            BreakerState::HalfOpen { .. } => {
                warn!("Probe failed; circuit re-opened");
                BreakerState::Open { since: Instant::now() }
            }
            BreakerState::Open { since } => BreakerState::Open { since },
        };
        *state = next;
    }
}

/// Admission granted by [`CircuitBreaker::try_acquire`].
#[must_use]
pub struct BreakerPermit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    settled: bool,
}

impl BreakerPermit<'_> {
    pub fn success(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for BreakerPermit<'_> {
    fn drop(&mut self) {
        if self.probe && !self.settled {
            warn!("Probe abandoned; circuit re-opened");
            self.breaker.record_failure();
        }
    }
}

/// Inventory port wrapped with a per-call timeout and a [`CircuitBreaker`].
///
/// Only transport failures count against the breaker; a definitive answer,
/// available or not, counts as success.
pub struct GuardedInventory<I> {
    inner: I,
    breaker: CircuitBreaker,
    call_timeout: Duration,
}

impl<I: InventoryService> GuardedInventory<I> {
    pub fn new(inner: I, breaker: CircuitBreaker, call_timeout: Duration) -> Self {
        Self {
            inner,
            breaker,
            call_timeout,
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

#[async_trait]
impl<I: InventoryService> InventoryService for GuardedInventory<I> {
    async fn check_availability(&self, product_id: u64, quantity: u32) -> Result<bool, ServiceError> {
        let Some(permit) = self.breaker.try_acquire() else {
            return Err(ServiceError::CircuitOpen("inventory".into()));
        };

        match tokio::time::timeout(self.call_timeout, self.inner.check_availability(product_id, quantity)).await {
            Ok(Ok(available)) => {
                permit.success();
                Ok(available)
            }
            Ok(Err(ServiceError::Rejected(reason))) => {
                permit.success();
                Err(ServiceError::Rejected(reason))
            }
            Ok(Err(e)) => {
                permit.failure();
                Err(e)
            }
            Err(_) => {
                permit.failure();
                Err(ServiceError::Unavailable(format!(
                    "inventory call timed out after {:?}",
                    self.call_timeout
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::ScriptedInventory;

    #[tokio::test(start_paused = true)]
    async fn test_breaker_opens_after_threshold_and_recovers() {
        let inventory = ScriptedInventory::available();
        inventory.fail_all(true);
        let guarded = GuardedInventory::new(
            inventory.clone(),
            CircuitBreaker::new(2, Duration::from_secs(30)),
            Duration::from_secs(1),
        );

        assert!(matches!(guarded.check_availability(1, 1).await, Err(ServiceError::Unavailable(_))));
        assert!(matches!(guarded.check_availability(1, 1).await, Err(ServiceError::Unavailable(_))));
        assert_eq!(guarded.breaker().state(), CircuitState::Open);

        // Short-circuited: the inner service is not called
        let calls = inventory.calls();
        assert!(matches!(guarded.check_availability(1, 1).await, Err(ServiceError::CircuitOpen(_))));
        assert_eq!(inventory.calls(), calls);

        tokio::time::advance(Duration::from_secs(31)).await;
        inventory.fail_all(false);
        assert_eq!(guarded.check_availability(1, 1).await, Ok(true));
        assert_eq!(guarded.breaker().state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_probe_does_not_wedge_the_circuit() {
        let inventory = ScriptedInventory::available();
        inventory.fail_all(true);
        let guarded = GuardedInventory::new(
            inventory.clone(),
            CircuitBreaker::new(1, Duration::from_secs(30)),
            Duration::from_secs(10),
        );
        assert!(matches!(guarded.check_availability(1, 1).await, Err(ServiceError::Unavailable(_))));
        assert_eq!(guarded.breaker().state(), CircuitState::Open);

        // The probe is slow and its caller gives up on it
        tokio::time::advance(Duration::from_secs(31)).await;
        inventory.fail_all(false);
        inventory.set_delay(Duration::from_secs(5));
        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), guarded.check_availability(1, 1)).await;
        assert!(abandoned.is_err());
        assert_eq!(guarded.breaker().state(), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(31)).await;
        inventory.set_delay(Duration::ZERO);
        assert_eq!(guarded.check_availability(1, 1).await, Ok(true));
        assert_eq!(guarded.breaker().state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_inventory_times_out() {
        let inventory = ScriptedInventory::available();
        inventory.set_delay(Duration::from_secs(5));
        let guarded = GuardedInventory::new(
            inventory,
            CircuitBreaker::new(5, Duration::from_secs(30)),
            Duration::from_millis(100),
        );

        assert!(matches!(guarded.check_availability(1, 1).await, Err(ServiceError::Unavailable(_))));
        assert_eq!(guarded.breaker().state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_unavailable_answer_does_not_trip_breaker() {
        let inventory = ScriptedInventory::available();
        inventory.set_unavailable(7);
        let guarded = GuardedInventory::new(
            inventory,
            CircuitBreaker::new(1, Duration::from_secs(30)),
            Duration::from_secs(1),
        );

        for _ in 0..3 {
            assert_eq!(guarded.check_availability(7, 1).await, Ok(false));
        }
        assert_eq!(guarded.breaker().state(), CircuitState::Closed);
    }
}
