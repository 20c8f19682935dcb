use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// A single cancellable delayed task.
///
/// Scheduling aborts whatever is outstanding and starts a new countdown, so
/// only the last call in a burst runs (trailing edge).
#[derive(Default)]
pub(crate) struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub(crate) fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel() {
            debug!(delay_ms = delay.as_millis() as u64, "debounce rescheduled");
        }
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Aborts the outstanding task. Returns whether one was still waiting or running.
    pub(crate) fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let live = !handle.is_finished();
                handle.abort();
                live
            }
            None => false,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
