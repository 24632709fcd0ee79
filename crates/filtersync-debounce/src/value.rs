//! Debounced values
//!
//! Provides [`DebouncedValue`], a settled view that lags its source by a
//! quiescence window.

use crate::error::DebounceError;
use crate::timer::Debouncer;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;

/// Handle returned by [`DebouncedValue::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Time-lagged view of a value
///
/// [`set`](Self::set) records a new source value; the settled value follows
/// only after the source has been stable for the window. Each `set` resets
/// the window, so intermediate values inside one burst are dropped.
/// [`force`](Self::force) settles immediately and discards the pending one.
///
/// Subscribers and [`watch`](Self::watch) receivers observe settled changes
/// only; settling to an equal value notifies nobody.
pub struct DebouncedValue<T> {
    shared: Arc<Shared<T>>,
    timer: Debouncer,
    delay: Duration,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    sender: watch::Sender<T>,
}

struct State<T> {
    settled: T,
    /// Bumped by every `set`/`force`; a timer only settles its own revision
    revision: u64,
    next_subscription: u64,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> DebouncedValue<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a value settled at `initial` on the current runtime
    ///
    /// # Errors
    /// Returns [`DebounceError::NoRuntime`] outside a runtime context
    pub fn new(initial: T, delay: Duration) -> Result<Self, DebounceError> {
        let (sender, _) = watch::channel(initial.clone());
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    settled: initial,
                    revision: 0,
                    next_subscription: 0,
                    subscribers: Vec::new(),
                }),
                sender,
            }),
            timer: Debouncer::new()?,
            delay,
        })
    }

    /// Current settled value
    #[must_use]
    pub fn get(&self) -> T {
        self.shared.state.lock().settled.clone()
    }

    /// Read the settled value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.state.lock().settled)
    }

    /// Record a new source value, settling it after the window
    ///
    /// # Errors
    /// Returns [`DebounceError::Disposed`] after [`dispose`](Self::dispose)
    pub fn set(&self, value: T) -> Result<(), DebounceError> {
        if self.timer.is_disposed() {
            return Err(DebounceError::Disposed);
        }

        let revision = {
            let mut state = self.shared.state.lock();
            state.revision += 1;
            state.revision
        };

        let shared = Arc::downgrade(&self.shared);
        self.timer
            .schedule(self.delay, move || settle_weak(&shared, revision, value))
    }

    /// Settle `value` now, bypassing the window
    ///
    /// A pending value from an earlier [`set`](Self::set) is discarded.
    ///
    /// # Errors
    /// Returns [`DebounceError::Disposed`] after [`dispose`](Self::dispose)
    pub fn force(&self, value: T) -> Result<(), DebounceError> {
        if self.timer.is_disposed() {
            return Err(DebounceError::Disposed);
        }

        self.timer.cancel();
        let revision = {
            let mut state = self.shared.state.lock();
            state.revision += 1;
            state.revision
        };
        self.shared.settle(revision, value);
        Ok(())
    }

    /// Apply `update` to the settled value and settle the result now
    ///
    /// # Errors
    /// Returns [`DebounceError::Disposed`] after [`dispose`](Self::dispose)
    pub fn force_with(&self, update: impl FnOnce(&T) -> T) -> Result<(), DebounceError> {
        let next = self.with(update);
        self.force(next)
    }

    /// Register a callback run after every settled change
    pub fn subscribe(&self, on_change: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let mut state = self.shared.state.lock();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.subscribers.push((id, Arc::new(on_change)));
        id
    }

    /// Remove a callback; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.shared.state.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|(sub, _)| *sub != id);
        state.subscribers.len() != before
    }

    /// Receiver that tracks the settled value
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<T> {
        self.shared.sender.subscribe()
    }

    /// Check whether a source value is waiting to settle
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Configured quiescence window
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel the pending value and stop accepting new ones
    pub fn dispose(&self) {
        self.timer.dispose();
        self.shared.state.lock().subscribers.clear();
    }

    /// Check whether the value was disposed
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.timer.is_disposed()
    }
}

fn settle_weak<T>(shared: &Weak<Shared<T>>, revision: u64, value: T)
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    if let Some(shared) = shared.upgrade() {
        shared.settle(revision, value);
    }
}

impl<T> Shared<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn settle(&self, revision: u64, value: T) {
        let subscribers = {
            let mut state = self.state.lock();
            if state.revision != revision {
                return;
            }
            // an equal value still replaces the stored one, silently
            let changed = state.settled != value;
            state.settled = value.clone();
            self.sender.send_if_modified(|current| {
                *current = value.clone();
                changed
            });
            if !changed {
                return;
            }
            state
                .subscribers
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect::<Vec<_>>()
        };

        for callback in subscribers {
            callback(&value);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DebouncedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("DebouncedValue")
            .field("settled", &state.settled)
            .field("revision", &state.revision)
            .field("subscribers", &state.subscribers.len())
            .field("delay", &self.delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WINDOW: Duration = Duration::from_millis(200);

    async fn wait(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    #[tokio::test(start_paused = true)]
    async fn settles_last_value_of_a_burst() {
        let value = DebouncedValue::new("a".to_string(), WINDOW).unwrap();

        value.set("b".into()).unwrap();
        wait(WINDOW / 2).await;
        value.set("c".into()).unwrap();
        wait(WINDOW / 2).await;

        assert_eq!(value.get(), "a");
        assert!(value.is_pending());

        wait(WINDOW).await;
        assert_eq!(value.get(), "c");
        assert!(!value.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn force_bypasses_and_discards_pending() {
        let value = DebouncedValue::new(0, WINDOW).unwrap();

        value.set(1).unwrap();
        value.force(7).unwrap();
        assert_eq!(value.get(), 7);

        wait(WINDOW * 2).await;
        assert_eq!(value.get(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn force_with_reads_settled_value() {
        let value = DebouncedValue::new(10, WINDOW).unwrap();
        value.set(99).unwrap();
        value.force_with(|settled| settled + 1).unwrap();
        assert_eq!(value.get(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_changes_only() {
        let value = DebouncedValue::new(0, WINDOW).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let id = value.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        value.force(0).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        value.set(1).unwrap();
        wait(WINDOW * 2).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(value.unsubscribe(id));
        assert!(!value.unsubscribe(id));
        value.force(2).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    /// Compares by `key` only
    #[derive(Debug, Clone)]
    struct Tagged {
        key: u8,
        tag: u8,
    }

    impl PartialEq for Tagged {
        fn eq(&self, other: &Self) -> bool {
            self.key == other.key
        }
    }

    #[tokio::test(start_paused = true)]
    async fn equal_value_replaces_without_notifying() {
        let value = DebouncedValue::new(Tagged { key: 1, tag: 0 }, WINDOW).unwrap();
        let rx = value.watch();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        value.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        value.set(Tagged { key: 1, tag: 9 }).unwrap();
        wait(WINDOW * 2).await;

        assert_eq!(value.get().tag, 9);
        assert_eq!(rx.borrow().tag, 9);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_receiver_tracks_settled_value() {
        let value = DebouncedValue::new(0, WINDOW).unwrap();
        let mut rx = value.watch();

        value.set(5).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_everything() {
        let value = DebouncedValue::new(0, WINDOW).unwrap();
        value.set(1).unwrap();
        value.dispose();

        wait(WINDOW * 2).await;
        assert_eq!(value.get(), 0);
        assert_eq!(value.set(2), Err(DebounceError::Disposed));
        assert_eq!(value.force(2), Err(DebounceError::Disposed));
    }
}
