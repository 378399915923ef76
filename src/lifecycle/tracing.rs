//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide subscriber.
//!
//! ## Configuration
//!
//! Output uses the compact format and hides the module prefix
//! (`with_target(false)`); store log lines carry an `entity_type` field instead.
//! Levels come from the `RUST_LOG` environment variable.
//!
//! ## What Gets Traced
//!
//! - **Store actors**: startup, shutdown and every create/get/update/delete/action
//! - **Orchestrator operations**: one span per call, with the caller id
//! - **Side effects**: failed notifications and event publishes at `warn`
//! - **Batches**: deadline expiry and the final success/failure counts
//!
//! ## Usage Examples
//!
//! ```bash
//! # Compact logs
//! RUST_LOG=info cargo run
//!
//! # Show full request payloads
//! RUST_LOG=debug cargo run
//!
//! # Only the orchestrator
//! RUST_LOG=order_orchestrator::service=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug`, entry points log their payload once:
//!
//! ```rust,ignore
//! debug!(?request, "create_order called");
//! ```
//!
//! A create then reads like this:
//!
//! ```text
//! DEBUG create_order{caller=Some("7")}: create_order called request=OrderCreate { customer_id: None, product_id: 1, quantity: 2, total_price: 100.0 }
//! DEBUG create_order{caller=Some("7")}: Action entity_type="Product" id=1 action=CheckStock
//! INFO create_order{caller=Some("7")}: Created entity_type="Order" id=1 size=1
//! INFO create_order{caller=Some("7")}: Order created order_id=1 customer_id=7
//! INFO Notification: order created order_id=1
//! ```

/// Installs the global subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // entity_type replaces module paths
        .compact()
        .init();
}
