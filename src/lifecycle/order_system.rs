use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::config::OrchestratorConfig;
use crate::adapters::{BroadcastPublisher, CircuitBreaker, GuardedInventory, LogNotifier, StubPaymentGateway};
use crate::cache::InMemoryCache;
use crate::clients::{OrderClient, ProductClient};
use crate::metrics::InMemoryMetrics;
use crate::ports::OrderRepository;
use crate::service::{BackgroundTasks, OrderService, Ports};

/// Capacity of the in-process event bus.
const EVENT_BUS_CAPACITY: usize = 256;

/// Failures of the system as a whole, as opposed to a single request.
#[derive(Debug, Error)]
pub enum SystemError {
    /// The order store did not answer at startup. Fatal.
    #[error("order store unreachable at startup: {0}")]
    StoreUnreachable(String),

    #[error("actor task failed: {0}")]
    ActorTaskFailed(String),
}

/// The running order-orchestration system.
///
/// `OrderSystem` is responsible for:
/// - **Lifecycle Management**: starting and stopping the store actors
/// - **Dependency Wiring**: building every adapter and injecting it into [`OrderService`]
/// - **Startup Checks**: refusing to start when the order store is unreachable
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::start(OrchestratorConfig::from_env()).await?;
/// let order = system.service.create_order(request, &Caller::user("7")).await?;
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// The orchestrator.
    pub service: OrderService,

    /// Direct access to the in-process inventory (seeding, restocking).
    pub product_client: ProductClient,

    /// Event bus; subscribe to observe order events.
    pub publisher: BroadcastPublisher,

    pub metrics: Arc<InMemoryMetrics>,

    order_client: OrderClient,

    /// Task handles for the store actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Spawns the store actors, wires the adapters and checks store connectivity.
    pub async fn start(config: OrchestratorConfig) -> Result<Self, SystemError> {
        info!(?config, "Starting order system");

        let (order_actor, order_client) = crate::order_actor::new(config.actor_buffer_size);
        let (product_actor, product_client) = crate::product_actor::new(config.actor_buffer_size);
        let order_handle = tokio::spawn(order_actor.run(()));
        let product_handle = tokio::spawn(product_actor.run(()));

        if let Err(e) = order_client.ping().await {
            error!(error = %e, "Order store unreachable");
            return Err(SystemError::StoreUnreachable(e.to_string()));
        }

        let publisher = BroadcastPublisher::new(EVENT_BUS_CAPACITY);
        let metrics = Arc::new(InMemoryMetrics::new());
        let inventory = GuardedInventory::new(
            product_client.clone(),
            CircuitBreaker::new(config.inventory_failure_threshold, config.inventory_reset),
            config.service_call_timeout,
        );

        let ports = Ports {
            repository: Arc::new(order_client.clone()),
            cache: Arc::new(InMemoryCache::new()),
            publisher: Arc::new(publisher.clone()),
            inventory: Arc::new(inventory),
            notifier: Arc::new(LogNotifier),
            payment: Arc::new(StubPaymentGateway::new()),
            metrics: metrics.clone(),
        };
        let service = OrderService::new(
            ports,
            config.service_settings(),
            BackgroundTasks::new(config.background_max_in_flight),
        );

        info!("Order system ready");
        Ok(Self {
            service,
            product_client,
            publisher,
            metrics,
            order_client,
            handles: vec![order_handle, product_handle],
        })
    }

    /// Gracefully shuts down the system.
    ///
    /// Pending side effects are drained first. Dropping the last clients then
    /// closes the actor mailboxes, and each actor exits its loop.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        self.service.background().wait_idle().await;

        drop(self.service);
        drop(self.order_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTaskFailed(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
