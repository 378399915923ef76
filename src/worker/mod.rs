//! Bounded-concurrency batch execution with an overall deadline.

pub mod pool;

pub use pool::{UnitError, UnitResult, WorkerPool};
