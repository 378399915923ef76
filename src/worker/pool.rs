use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Why a unit produced no value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UnitError {
    #[error("{0}")]
    Failed(String),

    /// The deadline passed before the unit reported.
    #[error("timed out")]
    TimedOut,
}

/// Exactly one of these is produced per submitted unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitResult<T> {
    /// Position of the unit in the submitted collection.
    pub id: usize,
    pub outcome: Result<T, UnitError>,
}

/// Runs independent units with at most `workers` in flight and a shared deadline.
///
/// Workers drain a shared queue. A unit is only taken off the queue before the
/// deadline, and the queue is emptied once it passes, so no new unit starts; units already running are left alone and whatever they
/// eventually return is discarded. Every unit that did not report in time is
/// reported as [`UnitError::TimedOut`].
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    timeout: Duration,
}

impl WorkerPool {
    pub fn new(workers: usize, timeout: Duration) -> Self {
        Self {
            workers: workers.max(1),
            timeout,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Executes `work` over `items`; results come back ordered by `id`.
    pub async fn run<I, T, E, F, Fut>(&self, items: Vec<I>, work: F) -> Vec<UnitResult<T>>
    where
        I: Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let total = items.len();
        let deadline = Instant::now() + self.timeout;
        let queue = Arc::new(Mutex::new(items.into_iter().enumerate().collect::<VecDeque<_>>()));
        let work = Arc::new(work);
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Result<T, UnitError>)>();

        for worker in 0..self.workers.min(total) {
            let queue = queue.clone();
            let work = work.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                loop {
                    let next = {
                        let mut queue = queue.lock();
                        if Instant::now() >= deadline {
                            queue.clear();
                            None
                        } else {
                            queue.pop_front()
                        }
                    };
                    let Some((id, item)) = next else { break };

                    // A panicking unit must still report, so it runs in its own task.
                    let outcome = match tokio::spawn((*work)(item)).await {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(e)) => Err(UnitError::Failed(e.to_string())),
                        Err(join_error) => Err(UnitError::Failed(format!("unit aborted: {join_error}"))),
                    };
                    if tx.send((id, outcome)).is_err() {
                        break;
                    }
                }
                debug!(worker, "Worker finished");
            });
        }
        drop(tx);

        let mut slots: Vec<Option<Result<T, UnitError>>> = (0..total).map(|_| None).collect();
        let mut received = 0;
        let mut timed_out = false;
        while received < total {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some((id, outcome))) => {
                    slots[id] = Some(outcome);
                    received += 1;
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    warn!(total, received, "Batch deadline reached; abandoning remaining units");
                    break;
                }
            }
        }
        queue.lock().clear();

        slots
            .into_iter()
            .enumerate()
            .map(|(id, slot)| UnitResult {
                id,
                outcome: slot.unwrap_or_else(|| {
                    if timed_out {
                        Err(UnitError::TimedOut)
                    } else {
                        Err(UnitError::Failed("worker exited before reporting".into()))
                    }
                }),
            })
            .collect()
    }
}
