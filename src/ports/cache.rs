use async_trait::async_trait;
use futures::future::BoxFuture;
use std::time::Duration;

use crate::order_actor::OrderError;

/// Deferred load run by [`OrderCache::get_or_set`] on a miss.
///
/// Futures are lazy, so a loader that is never polled never touches the store.
pub type CacheLoader = BoxFuture<'static, Result<String, OrderError>>;

/// Read-through cache of serialized orders.
///
/// Writes elsewhere never invalidate entries: a cached value may be stale
/// until its TTL lapses.
#[async_trait]
pub trait OrderCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, OrderError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), OrderError>;

    /// Returns the cached value or runs `loader` to populate it.
    ///
    /// Callers racing on the same key share one loader run and all observe its
    /// outcome. A failed load caches nothing.
    async fn get_or_set(
        &self,
        key: &str,
        ttl: Duration,
        loader: CacheLoader,
    ) -> Result<String, OrderError>;
}

/// Cache key for an order id.
pub fn order_cache_key(id: impl std::fmt::Display) -> String {
    format!("order:{id}")
}
