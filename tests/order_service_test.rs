use std::sync::Arc;
use std::time::Duration;

use order_orchestrator::adapters::mock::{
    Notification, RecordingNotifier, RecordingPublisher, ScriptedInventory, ScriptedPayment,
    SwitchableRepository,
};
use order_orchestrator::cache::InMemoryCache;
use order_orchestrator::metrics::InMemoryMetrics;
use order_orchestrator::model::{Order, OrderCreate, OrderCreateWithPayment, OrderId, OrderPatch};
use order_orchestrator::order_actor::OrderError;
use order_orchestrator::ports::{ORDERS_TOPIC, ORDER_CREATED_KEY};
use order_orchestrator::service::{BackgroundTasks, Caller, OrderService, Ports, ServiceSettings};

/// Orchestrator over a real order store actor and scriptable doubles for everything else.
struct Harness {
    service: OrderService,
    repository: SwitchableRepository,
    inventory: ScriptedInventory,
    notifier: RecordingNotifier,
    publisher: RecordingPublisher,
    payment: ScriptedPayment,
    metrics: Arc<InMemoryMetrics>,
}

impl Harness {
    fn new() -> Self {
        Self::with_settings(ServiceSettings::default())
    }

    fn with_settings(settings: ServiceSettings) -> Self {
        let (order_actor, orders) = order_orchestrator::order_actor::new(64);
        tokio::spawn(order_actor.run(()));

        let repository = SwitchableRepository::new(Arc::new(orders));
        let inventory = ScriptedInventory::available();
        let notifier = RecordingNotifier::new();
        let publisher = RecordingPublisher::new();
        let payment = ScriptedPayment::new();
        let metrics = Arc::new(InMemoryMetrics::new());

        let ports = Ports {
            repository: Arc::new(repository.clone()),
            cache: Arc::new(InMemoryCache::new()),
            publisher: Arc::new(publisher.clone()),
            inventory: Arc::new(inventory.clone()),
            notifier: Arc::new(notifier.clone()),
            payment: Arc::new(payment.clone()),
            metrics: metrics.clone(),
        };
        let service = OrderService::new(ports, settings, BackgroundTasks::new(64));

        Self {
            service,
            repository,
            inventory,
            notifier,
            publisher,
            payment,
            metrics,
        }
    }

    async fn place(&self, customer: &str) -> Order {
        self.service
            .create_order(OrderCreate::new(1, 1, 10.0), &Caller::user(customer))
            .await
            .expect("order should be created")
    }

    async fn settle(&self) {
        self.service.background().wait_idle().await;
    }
}

fn patch(status: &str) -> OrderPatch {
    OrderPatch {
        customer_id: None,
        product_id: 1,
        quantity: 2,
        total_price: 20.0,
        status: status.to_string(),
    }
}

// =============================================================================
// CREATE
// =============================================================================

#[tokio::test]
async fn test_create_assigns_caller_as_owner() {
    let h = Harness::new();

    let order = h
        .service
        .create_order(OrderCreate::new(1, 2, 100.0), &Caller::user("7"))
        .await
        .unwrap();

    assert_eq!(order.customer_id.as_str(), "7");
    assert_eq!(order.status, "pending");
    assert_eq!(order.quantity, 2);

    h.settle().await;
    let events = h.publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].topic, ORDERS_TOPIC);
    assert_eq!(events[0].routing_key, ORDER_CREATED_KEY);
    let payload: Order = serde_json::from_str(&events[0].payload).unwrap();
    assert_eq!(payload, order);
    assert_eq!(h.notifier.sent(), vec![Notification::Created(order.id)]);
    assert_eq!(h.metrics.snapshot().active_orders, 1);
}

#[tokio::test]
async fn test_create_ownership_rules() {
    let h = Harness::new();

    let matching = h
        .service
        .create_order(OrderCreate::new(1, 1, 5.0).for_customer("7"), &Caller::user("7"))
        .await
        .unwrap();
    assert_eq!(matching.customer_id.as_str(), "7");

    let mismatched = h
        .service
        .create_order(OrderCreate::new(1, 1, 5.0).for_customer("8"), &Caller::user("7"))
        .await;
    assert!(matches!(mismatched, Err(OrderError::Forbidden(_))));

    // Admins cannot place orders for someone else either
    let admin = Caller::user("1").with_roles("admin");
    let on_behalf = h
        .service
        .create_order(OrderCreate::new(1, 1, 5.0).for_customer("8"), &admin)
        .await;
    assert!(matches!(on_behalf, Err(OrderError::Forbidden(_))));

    assert_eq!(h.service.list_orders().await.unwrap().len(), 1);
    assert_eq!(h.inventory.calls(), 1);
}

#[tokio::test]
async fn test_create_rejections() {
    let h = Harness::new();

    assert_eq!(
        h.service
            .create_order(OrderCreate::new(1, 1, 5.0), &Caller::anonymous())
            .await,
        Err(OrderError::Unauthenticated)
    );
    assert!(matches!(
        h.service
            .create_order(OrderCreate::new(1, 0, 5.0), &Caller::user("7"))
            .await,
        Err(OrderError::Validation(_))
    ));

    h.inventory.set_unavailable(2);
    assert!(matches!(
        h.service
            .create_order(OrderCreate::new(2, 1, 5.0), &Caller::user("7"))
            .await,
        Err(OrderError::Validation(_))
    ));

    h.inventory.fail_product(3);
    assert!(matches!(
        h.service
            .create_order(OrderCreate::new(3, 1, 5.0), &Caller::user("7"))
            .await,
        Err(OrderError::DependencyUnavailable(_))
    ));

    assert!(h.service.list_orders().await.unwrap().is_empty());
    h.settle().await;
    assert!(h.publisher.events().is_empty());
}

#[tokio::test]
async fn test_store_failure_is_per_request() {
    let h = Harness::new();
    h.repository.set_offline(true);
    assert!(matches!(
        h.service
            .create_order(OrderCreate::new(1, 1, 5.0), &Caller::user("7"))
            .await,
        Err(OrderError::DependencyUnavailable(_))
    ));

    h.repository.set_offline(false);
    assert!(h
        .service
        .create_order(OrderCreate::new(1, 1, 5.0), &Caller::user("7"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_side_effect_failures_never_surface() {
    let h = Harness::new();
    h.notifier.set_failing(true);
    h.publisher.set_failing(true);

    let order = h.place("7").await;
    h.settle().await;

    assert_eq!(h.notifier.sent(), vec![Notification::Created(order.id)]);
    assert_eq!(h.publisher.events().len(), 1);
}

// =============================================================================
// CREATE WITH PAYMENT
// =============================================================================

#[tokio::test]
async fn test_create_with_payment_success() {
    let h = Harness::new();
    let request = OrderCreateWithPayment {
        order: OrderCreate::new(1, 2, 100.0),
        currency: "usd".into(),
    };

    let response = h
        .service
        .create_order_with_payment(request, &Caller::user("7"))
        .await
        .unwrap();

    let intent = response.payment_intent().expect("payment intent");
    assert_eq!(intent.order_id, response.order.id);
    assert_eq!(intent.amount_cents, 10_000);
    assert_eq!(response.payment_error(), None);

    h.settle().await;
    assert_eq!(h.publisher.events().len(), 1);
    assert_eq!(h.notifier.sent(), vec![Notification::Created(response.order.id)]);
}

#[tokio::test]
async fn test_payment_failure_keeps_the_order() {
    let h = Harness::new();
    h.payment.set_failing(true);
    let request = OrderCreateWithPayment {
        order: OrderCreate::new(1, 1, 10.0),
        currency: "usd".into(),
    };

    let response = h
        .service
        .create_order_with_payment(request, &Caller::user("7"))
        .await
        .expect("payment failure is a partial success");

    assert!(response.payment_intent().is_none());
    assert!(response.payment_error().unwrap().contains("payment"));

    let stored = h
        .service
        .get_order(&response.order.id.to_string(), &Caller::user("7"))
        .await
        .unwrap();
    assert_eq!(stored, response.order);

    h.settle().await;
    assert!(h.publisher.events().is_empty());
    assert!(h.notifier.sent().is_empty());
    assert_eq!(h.metrics.snapshot().orders_created, 1);
}

#[tokio::test]
async fn test_create_with_payment_requires_currency() {
    let h = Harness::new();
    let request = OrderCreateWithPayment {
        order: OrderCreate::new(1, 1, 10.0),
        currency: String::new(),
    };

    assert!(matches!(
        h.service.create_order_with_payment(request, &Caller::user("7")).await,
        Err(OrderError::Validation(_))
    ));
    assert_eq!(h.payment.calls(), 0);
}

// =============================================================================
// AUTHORIZATION
// =============================================================================

#[tokio::test]
async fn test_authorization_matrix() {
    let h = Harness::new();
    let anonymous = Caller::anonymous();
    let stranger = Caller::user("8");
    let admin = Caller::user("9").with_roles("admin");
    let owner = Caller::user("7");

    for caller in [&anonymous, &stranger, &admin, &owner] {
        let order = h.place("7").await;
        let id = order.id.to_string();

        let read = h.service.get_order(&id, caller).await.map(|_| ());
        let update = h.service.update_order(&id, patch("pending"), caller).await.map(|_| ());
        let delete = h.service.delete_order(&id, caller).await.map(|_| ());

        for outcome in [read, update, delete] {
            if caller == &anonymous {
                assert_eq!(outcome, Err(OrderError::Unauthenticated));
            } else if caller == &stranger {
                assert!(matches!(outcome, Err(OrderError::Forbidden(_))), "{outcome:?}");
            } else {
                assert_eq!(outcome, Ok(()));
            }
        }
    }
}

#[tokio::test]
async fn test_error_precedence() {
    let h = Harness::new();
    let owner = Caller::user("7");

    // Identity is checked before the identifier or the record
    assert_eq!(
        h.service.get_order("not-a-number", &Caller::anonymous()).await,
        Err(OrderError::Unauthenticated)
    );
    assert_eq!(
        h.service.delete_order("404", &Caller::anonymous()).await,
        Err(OrderError::Unauthenticated)
    );

    assert!(matches!(
        h.service.get_order("not-a-number", &owner).await,
        Err(OrderError::Validation(_))
    ));
    assert!(matches!(
        h.service.update_order_status("-1", "completed", &owner).await,
        Err(OrderError::Validation(_))
    ));

    assert_eq!(
        h.service.get_order("404", &owner).await,
        Err(OrderError::NotFound("404".into()))
    );
    assert_eq!(
        h.service.update_order("404", patch("pending"), &owner).await,
        Err(OrderError::NotFound("404".into()))
    );
    assert_eq!(
        h.service.update_order_status("404", "completed", &owner).await,
        Err(OrderError::NotFound("404".into()))
    );
}

#[tokio::test]
async fn test_update_cannot_reassign_owner() {
    let h = Harness::new();
    let order = h.place("7").await;
    let id = order.id.to_string();

    let mut reassign = patch("pending");
    reassign.customer_id = Some("8".into());
    let admin = Caller::user("1").with_roles("admin");
    assert!(matches!(
        h.service.update_order(&id, reassign, &admin).await,
        Err(OrderError::Forbidden(_))
    ));

    // An admin update keeps the existing owner
    let updated = h.service.update_order(&id, patch("pending"), &admin).await.unwrap();
    assert_eq!(updated.customer_id.as_str(), "7");
    assert_eq!(updated.quantity, 2);
}

// =============================================================================
// CACHE
// =============================================================================

#[tokio::test]
async fn test_cached_read_survives_store_outage() {
    let h = Harness::new();
    let order = h.place("7").await;
    let id = order.id.to_string();
    let owner = Caller::user("7");

    let first = h.service.get_order(&id, &owner).await.unwrap();
    h.repository.set_offline(true);
    let second = h.service.get_order(&id, &owner).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.repository.reads(), 1);
}

#[tokio::test]
async fn test_writes_do_not_invalidate_cached_reads() {
    let h = Harness::new();
    let order = h.place("7").await;
    let id = order.id.to_string();
    let owner = Caller::user("7");

    h.service.get_order(&id, &owner).await.unwrap();
    h.service.update_order_status(&id, "completed", &owner).await.unwrap();

    let cached = h.service.get_order(&id, &owner).await.unwrap();
    assert_eq!(cached.status, "pending");

    h.service.delete_order(&id, &owner).await.unwrap();
    assert!(h.service.get_order(&id, &owner).await.is_ok());
}

#[tokio::test]
async fn test_cached_reads_still_enforce_ownership() {
    let h = Harness::new();
    let order = h.place("7").await;
    let id = order.id.to_string();

    h.service.get_order(&id, &Caller::user("7")).await.unwrap();
    assert!(matches!(
        h.service.get_order(&id, &Caller::user("8")).await,
        Err(OrderError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_missing_order_is_not_cached() {
    let h = Harness::new();
    let owner = Caller::user("7");

    assert!(matches!(h.service.get_order("1", &owner).await, Err(OrderError::NotFound(_))));
    h.place("7").await;
    assert!(h.service.get_order("1", &owner).await.is_ok());
}

// =============================================================================
// STATUS CHANGES
// =============================================================================

#[tokio::test]
async fn test_update_notifies_only_on_status_change() {
    let h = Harness::new();
    let order = h.place("7").await;
    let id = order.id.to_string();
    let owner = Caller::user("7");

    h.service.update_order(&id, patch("completed"), &owner).await.unwrap();
    h.settle().await;
    assert_eq!(h.notifier.status_updates(order.id), vec!["completed".to_string()]);

    h.service.update_order(&id, patch("completed"), &owner).await.unwrap();
    h.settle().await;
    assert_eq!(h.notifier.status_updates(order.id).len(), 1);
}

#[tokio::test]
async fn test_status_update_counts_and_closes() {
    let h = Harness::new();
    let order = h.place("7").await;
    let other = h.place("8").await;
    let id = order.id.to_string();
    let admin = Caller::user("1").with_roles("admin");

    let change = h.service.update_order_status(&id, "completed", &admin).await.unwrap();
    assert_eq!(change.order_id, order.id);
    assert_eq!(change.previous_status, "pending");
    assert_eq!(change.status, "completed");
    assert_eq!(h.metrics.snapshot().active_orders, 1);
    h.settle().await;

    // Every terminal status closes, even when the order was already closed
    h.service.update_order_status(&id, "cancelled", &admin).await.unwrap();
    h.settle().await;

    let snapshot = h.metrics.snapshot();
    assert_eq!(snapshot.transitions_to("completed"), 1);
    assert_eq!(snapshot.transitions_to("cancelled"), 1);
    assert_eq!(snapshot.active_orders, 0);

    assert_eq!(
        h.notifier.status_updates(order.id),
        vec!["completed".to_string(), "cancelled".to_string()]
    );
    assert!(h.notifier.status_updates(other.id).is_empty());
    assert!(h.notifier.sent().contains(&Notification::StatusUpdate {
        order_id: order.id,
        customer_id: "7".into(),
        status: "completed".into(),
    }));
}

#[tokio::test]
async fn test_resubmitted_status_counts_but_does_not_notify() {
    let h = Harness::new();
    let order = h.place("7").await;
    let id = order.id.to_string();
    let owner = Caller::user("7");

    h.service.update_order_status(&id, "shipped", &owner).await.unwrap();
    let change = h.service.update_order_status(&id, "shipped", &owner).await.unwrap();
    assert_eq!(change.previous_status, "shipped");
    h.settle().await;

    let snapshot = h.metrics.snapshot();
    assert_eq!(snapshot.transitions_to("shipped"), 2);
    assert_eq!(snapshot.active_orders, 1);
    assert_eq!(h.notifier.status_updates(order.id), vec!["shipped".to_string()]);
}

#[tokio::test]
async fn test_status_is_free_form_but_required() {
    let h = Harness::new();
    let order = h.place("7").await;
    let id = order.id.to_string();
    let owner = Caller::user("7");

    let change = h.service.update_order_status(&id, "on-hold", &owner).await.unwrap();
    assert_eq!(change.status, "on-hold");
    assert_eq!(h.metrics.snapshot().active_orders, 1);

    assert!(matches!(
        h.service.update_order_status(&id, "  ", &owner).await,
        Err(OrderError::Validation(_))
    ));
}

#[tokio::test]
async fn test_delete_sends_cancelled_notification() {
    let h = Harness::new();
    let order = h.place("7").await;

    let removed = h
        .service
        .delete_order(&order.id.to_string(), &Caller::user("7"))
        .await
        .unwrap();
    assert_eq!(removed.id, order.id);

    h.settle().await;
    assert_eq!(h.notifier.status_updates(order.id), vec!["cancelled".to_string()]);
    assert!(h.service.list_orders().await.unwrap().is_empty());
}

// =============================================================================
// BATCH
// =============================================================================

#[tokio::test]
async fn test_batch_isolates_failures() {
    let h = Harness::new();
    h.inventory.fail_product(99);

    let mut requests: Vec<OrderCreate> = (0..7).map(|_| OrderCreate::new(1, 1, 10.0)).collect();
    requests[4] = OrderCreate::new(99, 1, 10.0);

    let summary = h.service.create_batch(requests, &Caller::user("7")).await.unwrap();

    assert_eq!(summary.total, 7);
    assert_eq!(summary.successful, 6);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failed_items.len(), 1);
    assert_eq!(summary.failed_items[0].item, 4);
    assert!(summary.failed_items[0].error.contains("inventory"));
    assert_eq!(summary.created.len(), 6);
    assert!(summary.created.iter().all(|o| o.customer_id.as_str() == "7"));
    assert_eq!(h.service.list_orders().await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_batch_reports_every_item_even_when_all_fail() {
    let h = Harness::new();
    h.inventory.fail_all(true);

    let requests: Vec<OrderCreate> = (0..5).map(|_| OrderCreate::new(1, 1, 10.0)).collect();
    let summary = h.service.create_batch(requests, &Caller::user("7")).await.unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.failed, 5);
    let mut items: Vec<usize> = summary.failed_items.iter().map(|f| f.item).collect();
    items.sort();
    assert_eq!(items, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_batch_requires_identity() {
    let h = Harness::new();
    assert_eq!(
        h.service
            .create_batch(vec![OrderCreate::new(1, 1, 1.0)], &Caller::anonymous())
            .await,
        Err(OrderError::Unauthenticated)
    );

    let empty = h.service.create_batch(Vec::new(), &Caller::user("7")).await.unwrap();
    assert_eq!(empty.total, 0);
    assert!(!empty.is_partial_failure());
}

#[tokio::test(start_paused = true)]
async fn test_batch_deadline_marks_late_items_timed_out() {
    let h = Harness::with_settings(ServiceSettings {
        cache_ttl: Duration::from_secs(60),
        batch_workers: 2,
        batch_timeout: Duration::from_millis(150),
    });
    h.inventory.set_delay(Duration::from_millis(100));

    let requests: Vec<OrderCreate> = (0..4).map(|_| OrderCreate::new(1, 1, 10.0)).collect();
    let summary = h.service.create_batch(requests, &Caller::user("7")).await.unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 2);
    assert!(summary.failed_items.iter().all(|f| f.error == "timed out"));
    assert!(summary.elapsed_time >= Duration::from_millis(150));
    assert!(summary.elapsed_time < Duration::from_secs(1));
}

#[tokio::test]
async fn test_list_orders_needs_no_identity() {
    let h = Harness::new();
    h.place("7").await;
    h.place("8").await;

    let orders = h.service.list_orders().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id, OrderId(1));
}
