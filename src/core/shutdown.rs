use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Shutdown,
}

/// The scheduler's only suspension point.
pub trait Waiter {
    /// Blocks for `duration` unless shutdown is requested first.
    fn wait(&self, duration: Duration) -> WaitOutcome;

    fn shutdown_requested(&self) -> bool;
}

struct Inner {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

/// Shutdown flag plus condvar so a pending wait wakes up as soon as the
/// flag flips. Cloned into the signal handler.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                stopped: Mutex::new(false),
                condvar: Condvar::new(),
            }),
        }
    }

    pub fn request(&self) {
        let mut stopped = self
            .inner
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        self.inner.condvar.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        *self
            .inner
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if shutdown was requested before the timeout.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let guard = self
            .inner
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .inner
            .condvar
            .wait_timeout_while(guard, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Waiter for Shutdown {
    fn wait(&self, duration: Duration) -> WaitOutcome {
        if self.wait_timeout(duration) {
            WaitOutcome::Shutdown
        } else {
            WaitOutcome::Elapsed
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.is_requested()
    }
}
