use async_trait::async_trait;
use futures::future::{FutureExt, Shared};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::order_actor::OrderError;
use crate::ports::{CacheLoader, OrderCache};

type SharedLoad = Shared<BoxFuture<'static, Result<String, OrderError>>>;

struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Entry>,
    /// Loads currently running, one per key.
    loading: HashMap<String, SharedLoad>,
}

impl CacheState {
    /// Returns a live value, evicting it if it has expired.
    fn lookup(&mut self, key: &str) -> Option<String> {
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }
}

/// Process-local cache with TTL expiry and deduplicated population.
///
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryCache {
    state: Arc<Mutex<CacheState>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.state
            .lock()
            .entries
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, OrderError> {
        Ok(self.state.lock().lookup(key))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), OrderError> {
        let expires_at = Instant::now() + ttl;
        self.state
            .lock()
            .entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn get_or_set(
        &self,
        key: &str,
        ttl: Duration,
        loader: CacheLoader,
    ) -> Result<String, OrderError> {
        let load = {
            let mut state = self.state.lock();
            if let Some(value) = state.lookup(key) {
                debug!(key, "Cache hit");
                return Ok(value);
            }
            match state.loading.get(key) {
                Some(load) => {
                    debug!(key, "Joining in-flight load");
                    load.clone()
                }
                None => {
                    debug!(key, "Cache miss");
                    let load = populate(self.state.clone(), key.to_string(), ttl, loader)
                        .boxed()
                        .shared();
                    state.loading.insert(key.to_string(), load.clone());
                    load
                }
            }
        };
        load.await
    }
}

/// Runs the loader once, stores a successful value and retires the in-flight marker.
async fn populate(
    state: Arc<Mutex<CacheState>>,
    key: String,
    ttl: Duration,
    loader: CacheLoader,
) -> Result<String, OrderError> {
    let result = match AssertUnwindSafe(loader).catch_unwind().await {
        Ok(result) => result,
        Err(_) => Err(OrderError::DependencyUnavailable(format!("cache load for {key} panicked"))),
    };
    let mut state = state.lock();
    state.loading.remove(&key);
    match &result {
        Ok(value) => {
            state.entries.insert(
                key,
                Entry {
                    value: value.clone(),
                    expires_at: Instant::now() + ttl,
                },
            );
        }
        Err(e) => warn!(key = %key, error = %e, "Cache load failed; nothing cached"),
    }
    result
}
