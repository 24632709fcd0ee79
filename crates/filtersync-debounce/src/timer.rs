//! Single-slot debounce timer
//!
//! Provides [`Debouncer`], the timer both debounced primitives are built on.

use crate::error::DebounceError;
use parking_lot::{Mutex, ReentrantMutex};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Trailing-edge timer holding at most one pending job
///
/// Scheduling a job resets the window: the previous job is aborted and
/// never runs. A job only runs if no newer job was scheduled and the timer
/// was not cancelled or disposed before its delay elapsed.
///
/// A job runs while holding the firing gate, and [`dispose`](Self::dispose)
/// passes through that gate before returning. Once `dispose` returns, no job
/// of this timer is running or will run, on any worker thread. A job may
/// dispose its own timer.
#[derive(Debug)]
pub struct Debouncer {
    handle: Handle,
    slot: Arc<Mutex<Slot>>,
    firing: Arc<ReentrantMutex<()>>,
}

#[derive(Debug, Default)]
struct Slot {
    /// Bumped on every schedule/cancel; a job only runs on its own generation
    generation: u64,
    task: Option<JoinHandle<()>>,
    disposed: bool,
}

impl Slot {
    fn supersede(&mut self) -> u64 {
        self.generation += 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation
    }
}

impl Debouncer {
    /// Create a timer on the current tokio runtime
    ///
    /// # Errors
    /// Returns [`DebounceError::NoRuntime`] outside a runtime context
    pub fn new() -> Result<Self, DebounceError> {
        let handle = Handle::try_current().map_err(|_| DebounceError::NoRuntime)?;
        Ok(Self::with_handle(handle))
    }

    /// Create a timer on an explicit runtime
    #[inline]
    #[must_use]
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            slot: Arc::new(Mutex::new(Slot::default())),
            firing: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// Run `job` once `delay` has passed without another schedule
    ///
    /// # Errors
    /// Returns [`DebounceError::Disposed`] after [`dispose`](Self::dispose)
    pub fn schedule<F>(&self, delay: Duration, job: F) -> Result<(), DebounceError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.slot.lock();
        if slot.disposed {
            return Err(DebounceError::Disposed);
        }

        let generation = slot.supersede();
        let weak = Arc::downgrade(&self.slot);
        let firing = Arc::clone(&self.firing);
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        tracing::trace!(generation, delay_ms, "debounce scheduled");

        slot.task = Some(self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _gate = firing.lock();
            if claim(&weak, generation) {
                job();
            }
        }));
        Ok(())
    }

    /// Drop the pending job, if any
    pub fn cancel(&self) {
        let mut slot = self.slot.lock();
        if slot.task.is_some() {
            let generation = slot.supersede();
            tracing::trace!(generation, "debounce cancelled");
        }
    }

    /// Cancel the pending job and refuse any further scheduling
    ///
    /// Waits for a job already running on another thread to finish.
    pub fn dispose(&self) {
        {
            let mut slot = self.slot.lock();
            slot.supersede();
            slot.disposed = true;
        }
        drop(self.firing.lock());
    }

    /// Check whether a job is waiting for its window to elapse
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Check whether the timer was disposed
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.slot.lock().disposed
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Take ownership of the slot for a firing job
///
/// Fails if the timer is gone, disposed, or moved on to a newer generation.
fn claim(slot: &Weak<Mutex<Slot>>, generation: u64) -> bool {
    let Some(slot) = slot.upgrade() else {
        return false;
    };
    let mut slot = slot.lock();
    if slot.disposed || slot.generation != generation {
        return false;
    }
    slot.task = None;
    true
}
