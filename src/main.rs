//! # Order Orchestrator Demo
//!
//! Starts the [`OrderSystem`], seeds the inventory and walks through the main
//! flows: plain create, create with payment, a batch with one bad item, a
//! status transition and a cached read.

use order_orchestrator::lifecycle::tracing::setup_tracing;
use order_orchestrator::lifecycle::{OrchestratorConfig, OrderSystem};
use order_orchestrator::model::{OrderCreate, OrderCreateWithPayment, ProductCreate, STATUS_COMPLETED};
use order_orchestrator::service::Caller;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = OrchestratorConfig::from_env();
    let currency = config.default_currency.clone();

    // A store that cannot be reached at startup is fatal
    let system = OrderSystem::start(config).await?;

    let product_id = system
        .product_client
        .create_product(ProductCreate {
            name: "Super Widget".to_string(),
            price: 25.50,
            quantity: 100,
        })
        .await?;
    info!(%product_id, "Inventory seeded");

    let alice = Caller::user("7");
    let admin = Caller::user("1").with_roles("admin");

    let span = tracing::info_span!("order_processing");
    let order = async {
        system
            .service
            .create_order(OrderCreate::new(product_id.0, 2, 51.0), &alice)
            .await
    }
    .instrument(span)
    .await?;
    info!(order_id = %order.id, customer_id = %order.customer_id, status = %order.status, "Order placed");

    let paid = system
        .service
        .create_order_with_payment(
            OrderCreateWithPayment {
                order: OrderCreate::new(product_id.0, 1, 25.5),
                currency,
            },
            &alice,
        )
        .await?;
    match (paid.payment_intent(), paid.payment_error()) {
        (Some(intent), _) => info!(order_id = %paid.order.id, intent_id = %intent.id, "Order placed with payment"),
        (_, Some(e)) => error!(order_id = %paid.order.id, error = e, "Order placed but payment failed"),
        _ => {}
    }

    let batch = vec![
        OrderCreate::new(product_id.0, 1, 25.5),
        OrderCreate::new(product_id.0, 500, 12_750.0),
        OrderCreate::new(product_id.0, 3, 76.5),
    ];
    let summary = system.service.create_batch(batch, &alice).await?;
    info!(
        total = summary.total,
        successful = summary.successful,
        failed = summary.failed,
        "Batch submitted"
    );
    for failure in &summary.failed_items {
        info!(item = failure.item, error = %failure.error, "Batch item failed");
    }

    let id = order.id.to_string();
    let change = system
        .service
        .update_order_status(&id, STATUS_COMPLETED, &admin)
        .await?;
    info!(from = %change.previous_status, to = %change.status, "Status updated");

    let fetched = system.service.get_order(&id, &alice).await?;
    info!(order_id = %fetched.id, status = %fetched.status, "Order read");

    let snapshot = system.metrics.snapshot();
    info!(
        created = snapshot.orders_created,
        active = snapshot.active_orders,
        completed = snapshot.transitions_to(STATUS_COMPLETED),
        "Metrics"
    );

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
