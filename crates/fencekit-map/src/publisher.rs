//! Debounced publication
//!
//! A single timer slot: each publish cancels the pending one, so a burst of
//! values delivers only the last after the quiet interval. Must be used from
//! within a tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use fencekit_core::SharedCallback;
use tokio::task::JoinHandle;

pub struct DebouncedPublisher<T> {
    interval: Duration,
    sink: SharedCallback<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T> DebouncedPublisher<T> {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a value is waiting for its interval to elapse
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Drop the pending value, if any. Returns true if one was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let live = !handle.is_finished();
                handle.abort();
                live
            }
            None => false,
        }
    }
}

impl<T: Send + 'static> DebouncedPublisher<T> {
    pub fn new<F>(interval: Duration, sink: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            interval,
            sink: Arc::new(sink),
            pending: None,
        }
    }

    /// Schedule `value`, superseding anything still pending
    pub fn publish(&mut self, value: T) {
        if self.cancel() {
            tracing::trace!("Debounced value superseded");
        }

        let sink = Arc::clone(&self.sink);
        let interval = self.interval;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            sink(value);
        }));
    }
}

impl<T> Drop for DebouncedPublisher<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<T> std::fmt::Debug for DebouncedPublisher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedPublisher")
            .field("interval", &self.interval)
            .field("pending", &self.is_pending())
            .finish()
    }
}
