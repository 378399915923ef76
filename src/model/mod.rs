//! Pure data structures: orders, products, payment intents and batch results.

pub mod batch;
pub mod order;
pub mod payment;
pub mod product;

pub use batch::*;
pub use order::*;
pub use payment::*;
pub use product::*;
