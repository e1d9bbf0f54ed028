use thiserror::Error;

/// Failure modes of the pool, observed either synchronously from
/// [`submit`](crate::WorkerPool::submit) or through a task's handle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Shutdown has begun; the pool no longer accepts work.
    #[error("worker pool is closed")]
    Closed,

    /// The pool was torn down before this task got to run.
    #[error("worker pool shut down before the task ran")]
    Abandoned,

    /// The task panicked while running. The worker that ran it keeps
    /// serving the queue.
    #[error("task panicked: {0}")]
    Panicked(String),
}
