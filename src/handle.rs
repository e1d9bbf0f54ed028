use super::errors::PoolError;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::oneshot;

/// Receiving side of a submitted task's result.
///
/// Await it to get the task's return value, or call [`wait`](Self::wait)
/// from a thread that is not inside the runtime. Dropping the handle
/// detaches from the result; the task itself still runs.
pub struct TaskHandle<R> {
    receiver: oneshot::Receiver<Result<R, PoolError>>,
}

impl<R> TaskHandle<R> {
    pub(crate) fn new(receiver: oneshot::Receiver<Result<R, PoolError>>) -> Self {
        Self { receiver }
    }

    /// Block the calling thread until the task resolves.
    ///
    /// Intended for plain OS threads; panics if called from within an
    /// async runtime.
    pub fn wait(self) -> Result<R, PoolError> {
        self.receiver
            .blocking_recv()
            .unwrap_or(Err(PoolError::Abandoned))
    }
}

impl<R> Future for TaskHandle<R> {
    type Output = Result<R, PoolError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            // A dropped sender means the task was thrown away before it
            // could report, which only happens when the pool abandons
            // its queue during teardown.
            Poll::Ready(res) => Poll::Ready(res.unwrap_or(Err(PoolError::Abandoned))),
            Poll::Pending => Poll::Pending,
        }
    }
}
