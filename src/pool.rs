use super::{errors::PoolError, handle::TaskHandle, metrics::PoolMetrics};
use parking_lot::Mutex;
use std::{
    collections::VecDeque,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::{
    sync::{oneshot, Notify},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// What happens to tasks still queued when shutdown begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// Run everything already accepted before the workers exit.
    #[default]
    Drain,
    /// Discard queued tasks; their handles resolve to
    /// [`PoolError::Abandoned`].
    Abandon,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub workers: usize,
    pub shutdown: ShutdownPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            shutdown: ShutdownPolicy::default(),
        }
    }
}

impl Config {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownPolicy) -> Self {
        self.shutdown = shutdown;
        self
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    queue: Mutex<VecDeque<Job>>,
    wake: Notify,
    stop: CancellationToken,
    running: AtomicUsize,
    // Job closures clone these two instead of holding `Shared`, which
    // would cycle through the queue that owns the jobs.
    completed: Arc<AtomicUsize>,
    panicked: Arc<AtomicUsize>,
    config: Config,
}

impl Shared {
    async fn worker_loop(&self, worker: usize) {
        debug!(worker, "worker started");
        loop {
            // Arm the wakeup before looking at the queue so a push that
            // lands right after an empty check cannot be missed.
            let wake = self.wake.notified();
            tokio::pin!(wake);
            wake.as_mut().enable();

            let job = {
                let mut queue = self.queue.lock();
                match queue.pop_front() {
                    Some(job) => Some(job),
                    None if self.stop.is_cancelled() => break,
                    None => None,
                }
            };

            match job {
                Some(job) => {
                    trace!(worker, "task dequeued");
                    self.running.fetch_add(1, Ordering::Relaxed);
                    job();
                    self.running.fetch_sub(1, Ordering::Relaxed);
                }
                None => wake.await,
            }
        }
        debug!(worker, "worker stopped");
    }
}

/// A fixed-size pool of workers consuming one shared FIFO queue.
///
/// Workers are spawned onto the ambient Tokio runtime at construction and
/// live until shutdown. Tasks are plain closures, each run to completion by
/// exactly one worker; a submission returns a [`TaskHandle`] that resolves
/// to the closure's return value.
///
/// Dropping the pool stops intake and lets the workers wind down in the
/// background; call [`shutdown`](Self::shutdown) to also wait for them.
pub struct WorkerPool {
    shared: Arc<Shared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Start a pool with `workers` workers and the default drain shutdown.
    ///
    /// A worker count of 0 is treated as 1. Must be called from within a
    /// Tokio runtime.
    pub fn new(workers: usize) -> Self {
        Self::with_config(Config::default().with_workers(workers))
    }

    pub fn with_config(mut config: Config) -> Self {
        config.workers = config.workers.max(1);

        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            wake: Notify::new(),
            stop: CancellationToken::new(),
            running: AtomicUsize::new(0),
            completed: Arc::new(AtomicUsize::new(0)),
            panicked: Arc::new(AtomicUsize::new(0)),
            config,
        });

        let handles = (0..shared.config.workers)
            .map(|worker| {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move { shared.worker_loop(worker).await })
            })
            .collect();

        info!(workers = shared.config.workers, "worker pool started");

        Self {
            shared,
            handles: Mutex::new(handles),
        }
    }

    /// Hand a closure to the pool.
    ///
    /// The task joins the tail of the queue and is picked up in submission
    /// order. Fails with [`PoolError::Closed`] once shutdown has begun; a
    /// rejected task is never enqueued.
    pub fn submit<F, R>(&self, work: F) -> Result<TaskHandle<R>, PoolError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let completed = Arc::clone(&self.shared.completed);
        let panicked = Arc::clone(&self.shared.panicked);

        // The job owns the result sender, so a task that gets dropped
        // instead of run closes the channel and fails its handle.
        let job: Job = Box::new(move || {
            let outcome = match catch_unwind(AssertUnwindSafe(work)) {
                Ok(value) => {
                    completed.fetch_add(1, Ordering::Relaxed);
                    Ok(value)
                }
                Err(payload) => {
                    panicked.fetch_add(1, Ordering::Relaxed);
                    let message = panic_message(payload);
                    warn!(%message, "task panicked");
                    Err(PoolError::Panicked(message))
                }
            };
            let _ = tx.send(outcome);
        });

        {
            let mut queue = self.shared.queue.lock();
            if self.shared.stop.is_cancelled() {
                return Err(PoolError::Closed);
            }
            queue.push_back(job);
        }
        self.shared.wake.notify_one();

        Ok(TaskHandle::new(rx))
    }

    /// Stop accepting work and wait for the workers to exit.
    ///
    /// Under [`ShutdownPolicy::Drain`] every task accepted before this call
    /// still runs; under [`ShutdownPolicy::Abandon`] still-queued tasks are
    /// discarded and their handles resolve to [`PoolError::Abandoned`].
    /// Idempotent: only the first call joins the workers.
    pub async fn shutdown(&self) {
        self.close();

        let workers = std::mem::take(&mut *self.handles.lock());
        if workers.is_empty() {
            return;
        }
        info!(workers = workers.len(), "shutting down worker pool");
        for handle in workers {
            // Worker tasks never panic on their own; a join error can only
            // mean the runtime itself is going away.
            let _ = handle.await;
        }
        debug!("all workers exited");
    }

    /// Cancel intake and wake every worker. The cancellation happens under
    /// the queue lock, so it cannot interleave with a submission's
    /// closed-check.
    fn close(&self) {
        let abandoned = {
            let mut queue = self.shared.queue.lock();
            if self.shared.stop.is_cancelled() {
                return;
            }
            self.shared.stop.cancel();
            match self.shared.config.shutdown {
                ShutdownPolicy::Drain => VecDeque::new(),
                ShutdownPolicy::Abandon => std::mem::take(&mut *queue),
            }
        };
        if !abandoned.is_empty() {
            debug!(discarded = abandoned.len(), "abandoning queued tasks");
        }
        // Dropped outside the lock; each job takes its result sender with
        // it, resolving the matching handle.
        drop(abandoned);
        self.shared.wake.notify_waiters();
    }

    /// True once shutdown has begun.
    pub fn is_closed(&self) -> bool {
        self.shared.stop.is_cancelled()
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            workers: self.shared.config.workers,
            queued_tasks: self.shared.queue.lock().len(),
            running_tasks: self.shared.running.load(Ordering::Relaxed),
            completed_tasks: self.shared.completed.load(Ordering::Relaxed),
            panicked_tasks: self.shared.panicked.load(Ordering::Relaxed),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Cannot await worker exit here; stop intake and wake sleepers so
        // they wind down on their own.
        self.close();
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
