//! Batch submission over the [`WorkerPool`].

use tokio::time::Instant;
use tracing::{info, instrument};

use super::auth::Caller;
use super::order_service::OrderService;
use crate::model::{BatchSummary, FailedItem, OrderCreate};
use crate::order_actor::OrderError;
use crate::worker::WorkerPool;

impl OrderService {
    /// Runs `create_order` for every request under the configured worker count
    /// and deadline.
    ///
    /// Always returns a summary once the caller is identified; per-item failures,
    /// timeouts included, are reported in `failed_items` by position.
    #[instrument(skip(self, requests, caller), fields(caller = ?caller.id, total = requests.len()))]
    pub async fn create_batch(
        &self,
        requests: Vec<OrderCreate>,
        caller: &Caller,
    ) -> Result<BatchSummary, OrderError> {
        caller.identity()?;
        let started = Instant::now();
        let total = requests.len();
        let pool = WorkerPool::new(self.settings.batch_workers, self.settings.batch_timeout);

        let service = self.clone();
        let owner = caller.clone();
        let results = pool
            .run(requests, move |request| {
                let service = service.clone();
                let caller = owner.clone();
                async move { service.create_order(request, &caller).await }
            })
            .await;

        let mut created = Vec::new();
        let mut failed_items = Vec::new();
        for result in results {
            match result.outcome {
                Ok(order) => created.push(order),
                Err(e) => failed_items.push(FailedItem {
                    item: result.id,
                    error: e.to_string(),
                }),
            }
        }

        let summary = BatchSummary {
            total,
            successful: created.len(),
            failed: failed_items.len(),
            failed_items,
            created,
            elapsed_time: started.elapsed(),
        };
        info!(
            successful = summary.successful,
            failed = summary.failed,
            elapsed_ms = summary.elapsed_time.as_millis() as u64,
            "Batch processed"
        );
        Ok(summary)
    }
}
