//! Process-scoped counters behind the [`OrderMetrics`] port.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::info;

use crate::ports::OrderMetrics;

/// Point-in-time copy of the metric values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub orders_created: u64,
    /// Orders created and not yet moved to a terminal status.
    pub active_orders: i64,
    /// Status-only transitions, labeled by the new status.
    pub status_transitions: BTreeMap<String, u64>,
}

impl MetricsSnapshot {
    pub fn transitions_to(&self, status: &str) -> u64 {
        self.status_transitions.get(status).copied().unwrap_or(0)
    }
}

/// In-memory [`OrderMetrics`] implementation.
///
/// Created once at startup and shared. Values change only through the port
/// methods, or through [`InMemoryMetrics::reset`].
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    values: Mutex<MetricsSnapshot>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.values.lock().clone()
    }

    /// Operator action: zero every counter and gauge.
    pub fn reset(&self) {
        *self.values.lock() = MetricsSnapshot::default();
        info!("Order metrics reset");
    }
}

impl OrderMetrics for InMemoryMetrics {
    fn order_created(&self) {
        let mut values = self.values.lock();
        values.orders_created += 1;
        values.active_orders += 1;
    }

    fn status_transition(&self, status: &str) {
        *self
            .values
            .lock()
            .status_transitions
            .entry(status.to_string())
            .or_default() += 1;
    }

    fn order_closed(&self) {
        self.values.lock().active_orders -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_gauge() {
        let metrics = InMemoryMetrics::new();
        metrics.order_created();
        metrics.order_created();
        metrics.status_transition("completed");
        metrics.order_closed();
        metrics.status_transition("shipped");
        metrics.status_transition("shipped");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.orders_created, 2);
        assert_eq!(snapshot.active_orders, 1);
        assert_eq!(snapshot.transitions_to("completed"), 1);
        assert_eq!(snapshot.transitions_to("shipped"), 2);
        assert_eq!(snapshot.transitions_to("cancelled"), 0);

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
