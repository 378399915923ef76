#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Order Orchestrator
//!
//! > **The order-orchestration core of a commerce backend.**
//!
//! This crate accepts single and batch order submissions, checks inventory,
//! persists orders, serves reads through a single-flight cache, publishes
//! lifecycle events and triggers payment and notification side effects. Every
//! collaborator sits behind a narrow capability port, so production adapters and
//! test doubles are interchangeable.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Ports at the seams
//! [`OrderService`](service::OrderService) never names a concrete store, cache,
//! broker or gateway. It receives `Arc<dyn Port>` values at construction
//! ([`Ports`](service::Ports)), and nothing is resolved through global lookup.
//!
//! ### Actors for state
//! The in-process order store and inventory are generic
//! [`ResourceActor`](framework::ResourceActor)s. Each runs in its own task and
//! processes its mailbox sequentially, which gives row-level last-write-wins
//! without locks.
//!
//! ### Partial success is a success
//! A failed payment after the order was written, or failed items in a batch,
//! are reported inside a successful result
//! ([`PaymentOutcome`](model::PaymentOutcome), [`BatchSummary`](model::BatchSummary)).
//! Only the synchronous critical path (inventory, store, payment) can fail a call.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Authorization
//! Every operation checks, in order: identity present
//! ([`Unauthenticated`](order_actor::OrderError::Unauthenticated)), identifier
//! valid, record present ([`NotFound`](order_actor::OrderError::NotFound)), caller
//! is owner or admin ([`Forbidden`](order_actor::OrderError::Forbidden)).
//!
//! ### 2. Fire-and-forget side effects
//! Notifications and event publishing run on
//! [`BackgroundTasks`](service::BackgroundTasks), bounded by a semaphore. They
//! never add latency to a response and their failures are only logged.
//!
//! ### 3. Cache staleness
//! Updates and deletes do not invalidate the read cache. A cached order is
//! served until its TTL lapses, even if the store has changed or gone away.
//!
//! ### 4. Batches
//! [`WorkerPool`](worker::WorkerPool) runs at most `W` creations at once under
//! one deadline. Units still running at the deadline are abandoned, not
//! interrupted, and reported as timed out.
//!
//! ## 🗺️ Module Tour
//!
//! - [`framework`]: the generic actor engine and its mock client.
//! - [`model`]: orders, products, payment intents and result shapes.
//! - [`order_actor`], [`product_actor`]: `ActorEntity` implementations and errors.
//! - [`clients`]: typed clients over the actors; they implement the store and inventory ports.
//! - [`ports`]: the capability traits.
//! - [`adapters`]: event bus, notifier, payment stub, circuit breaker and test doubles.
//! - [`cache`], [`worker`], [`metrics`]: the supporting engines.
//! - [`service`]: the orchestrator itself.
//! - [`lifecycle`]: configuration, tracing setup, startup and shutdown.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # Run the tests
//! cargo test
//! ```

pub mod adapters;
pub mod cache;
pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod metrics;
pub mod model;
pub mod order_actor;
pub mod ports;
pub mod product_actor;
pub mod service;
pub mod worker;
