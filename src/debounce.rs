//! Single-slot debounce timer
//!
//! Holds at most one pending timer. Scheduling a new action aborts the timer
//! held so far, so only the most recent action runs, once the quiet period
//! has elapsed without another schedule.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Owns the pending timer of one debounced pipeline
#[derive(Debug)]
pub struct Debouncer {
    /// Quiet period before the scheduled action runs
    delay: Duration,
    /// Timer task of the most recent schedule, if any
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending timer with one that runs `action` after the delay.
    ///
    /// The action is spawned as its own task once the timer fires, so a later
    /// schedule or `cancel` never interrupts work that has already started.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action);
        }));
    }

    /// Drops the pending timer without running its action
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a timer is waiting to fire
    pub fn has_pending(&self) -> bool {
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
