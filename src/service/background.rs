//! Detached side effects with a bound on how many may be in flight.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Spawner for fire-and-forget work (notifications, event publishing).
///
/// Submitting never waits. When `capacity` tasks are already running the new
/// one is shed, logged and counted in [`BackgroundTasks::dropped`].
#[derive(Clone)]
pub struct BackgroundTasks {
    permits: Arc<Semaphore>,
    capacity: u32,
    dropped: Arc<AtomicU64>,
}

impl BackgroundTasks {
    pub fn new(max_in_flight: usize) -> Self {
        let capacity = max_in_flight
            .clamp(1, Semaphore::MAX_PERMITS)
            .min(u32::MAX as usize) as u32;
        Self {
            permits: Arc::new(Semaphore::new(capacity as usize)),
            capacity,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Spawns `task` if there is room. Returns whether it was accepted.
    pub fn spawn<F>(&self, label: &'static str, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.permits.clone().try_acquire_owned() {
            Ok(permit) => {
                tokio::spawn(async move {
                    task.await;
                    drop(permit);
                });
                debug!(label, "Background task submitted");
                true
            }
            Err(_) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(label, dropped, "Background capacity exhausted; side effect dropped");
                false
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.capacity as usize - self.permits.available_permits()
    }

    /// Side effects shed because capacity was exhausted.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Waits until every task submitted so far has finished.
    pub async fn wait_idle(&self) {
        if let Ok(all) = self.permits.acquire_many(self.capacity).await {
            drop(all);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_saturated_tasks_are_shed() {
        let background = BackgroundTasks::new(1);
        let (release, gate) = oneshot::channel::<()>();

        assert!(background.spawn("held", async move {
            let _ = gate.await;
        }));
        assert_eq!(background.in_flight(), 1);

        assert!(!background.spawn("shed", async {}));
        assert_eq!(background.dropped(), 1);

        release.send(()).unwrap();
        background.wait_idle().await;
        assert_eq!(background.in_flight(), 0);
        assert!(background.spawn("after", async {}));
    }

    #[tokio::test]
    async fn test_wait_idle_waits_for_all_tasks() {
        let background = BackgroundTasks::new(8);
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let done = done.clone();
            background.spawn("count", async move {
                tokio::task::yield_now().await;
                done.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            });
        }
        background.wait_idle().await;
        assert_eq!(done.load(std::sync::atomic::Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_panicking_task_releases_its_slot() {
        let background = BackgroundTasks::new(1);
        background.spawn("panics", async { panic!("side effect failed") });
        background.wait_idle().await;
        assert_eq!(background.in_flight(), 0);
    }
}
