//! Factory implementations for concrete database backends

pub mod pool;

pub use pool::{SqlxFactory, SqlxPool};
