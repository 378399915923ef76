/// Process-scoped order metrics.
///
/// Implementations are created once at startup and shared; values are only
/// reset by explicit operator action.
pub trait OrderMetrics: Send + Sync {
    /// An order was persisted and became active.
    fn order_created(&self);

    /// A status-only update was applied, labeled by the new status.
    fn status_transition(&self, status: &str);

    /// An order reached a terminal status.
    fn order_closed(&self);
}
