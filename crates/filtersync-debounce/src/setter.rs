//! Debounced setters
//!
//! Provides [`DebouncedSetter`], which coalesces bursts of calls into a
//! single invocation carrying the last argument.

use crate::error::DebounceError;
use crate::timer::Debouncer;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type Target<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Setter wrapper with trailing-edge debounce
pub struct DebouncedSetter<A> {
    target: Target<A>,
    pending: Arc<Mutex<Option<A>>>,
    timer: Debouncer,
    delay: Duration,
}

impl<A: Send + 'static> DebouncedSetter<A> {
    /// Wrap `target` on the current runtime
    ///
    /// # Errors
    /// Returns [`DebounceError::NoRuntime`] outside a runtime context
    pub fn new(
        target: impl Fn(A) + Send + Sync + 'static,
        delay: Duration,
    ) -> Result<Self, DebounceError> {
        Ok(Self {
            target: Arc::new(target),
            pending: Arc::new(Mutex::new(None)),
            timer: Debouncer::new()?,
            delay,
        })
    }

    /// Record a call; the target runs once the window passes quietly
    ///
    /// # Errors
    /// Returns [`DebounceError::Disposed`] after [`dispose`](Self::dispose)
    pub fn call(&self, arg: A) -> Result<(), DebounceError> {
        if self.timer.is_disposed() {
            return Err(DebounceError::Disposed);
        }
        *self.pending.lock() = Some(arg);

        let pending = Arc::clone(&self.pending);
        let target = Arc::clone(&self.target);
        self.timer.schedule(self.delay, move || {
            let arg = pending.lock().take();
            if let Some(arg) = arg {
                target(arg);
            }
        })
    }

    /// Run the pending call now; returns whether one was pending
    pub fn flush(&self) -> bool {
        if self.timer.is_disposed() {
            return false;
        }
        self.timer.cancel();
        let arg = self.pending.lock().take();
        match arg {
            Some(arg) => {
                (self.target)(arg);
                true
            }
            None => false,
        }
    }

    /// Drop the pending call without running it
    pub fn cancel(&self) {
        self.timer.cancel();
        self.pending.lock().take();
    }

    /// Check whether a call is waiting
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Configured quiescence window
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Check whether the setter was disposed
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.timer.is_disposed()
    }

    /// Cancel the pending call and refuse new ones
    pub fn dispose(&self) {
        self.timer.dispose();
        self.pending.lock().take();
    }
}

impl<A> fmt::Debug for DebouncedSetter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedSetter")
            .field("timer", &self.timer)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) + Send + Sync + 'static) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        (calls, move |arg| sink.lock().push(arg))
    }

    #[tokio::test(start_paused = true)]
    async fn last_call_wins() {
        let (calls, target) = recorder();
        let setter = DebouncedSetter::new(target, WINDOW).unwrap();

        for arg in 1..=4 {
            setter.call(arg).unwrap();
            tokio::time::sleep(WINDOW / 4).await;
        }
        assert!(calls.lock().is_empty());

        tokio::time::sleep(WINDOW).await;
        assert_eq!(*calls.lock(), vec![4]);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_fire_separately() {
        let (calls, target) = recorder();
        let setter = DebouncedSetter::new(target, WINDOW).unwrap();

        setter.call(1).unwrap();
        tokio::time::sleep(WINDOW * 2).await;
        setter.call(2).unwrap();
        tokio::time::sleep(WINDOW * 2).await;

        assert_eq!(*calls.lock(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_runs_now_and_only_once() {
        let (calls, target) = recorder();
        let setter = DebouncedSetter::new(target, WINDOW).unwrap();

        setter.call(3).unwrap();
        assert!(setter.flush());
        assert!(!setter.flush());
        tokio::time::sleep(WINDOW * 2).await;

        assert_eq!(*calls.lock(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_drops_pending_call() {
        let (calls, target) = recorder();
        let setter = DebouncedSetter::new(target, WINDOW).unwrap();

        setter.call(1).unwrap();
        setter.dispose();
        tokio::time::sleep(WINDOW * 2).await;

        assert!(calls.lock().is_empty());
        assert_eq!(setter.call(2), Err(DebounceError::Disposed));
        assert!(!setter.is_pending());
    }
}
