//! Fixed-size worker pool over one shared FIFO queue
//!
//! # Features
//! - Bounded set of long-lived workers on the Tokio runtime
//! - Strict FIFO pickup of submitted closures
//! - One-shot result handles, awaitable or blocking
//! - Panic capture per task; one failure never stops the pool
//! - Drain or abandon shutdown, configurable
//! - Lightweight activity metrics

pub mod errors;
pub mod handle;
pub mod metrics;
pub mod pool;

pub use errors::PoolError;
pub use handle::TaskHandle;
pub use metrics::PoolMetrics;
pub use pool::{Config, ShutdownPolicy, WorkerPool};
