//! Filter context facade
//!
//! Provides [`FilterContext`], the handle consuming UI code reads and writes
//! filters through.
//!
//! Reads (`get_filter`, `active_keys`) always see the *settled* model, which
//! lags the live model by the settle window. Writes apply to the live model
//! synchronously; [`SetMode::Immediate`] additionally settles at once.

use crate::error::{FilterError, ScopeError};
use crate::linker::resolve;
use crate::provider::Scope;
use crate::setter::{FilterSetter, KeySetter, ValueSetter};
use filtersync_debounce::SubscriptionId;
use filtersync_model::{ensure_array, FilterModel, FilterValue, LocationQuery};
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// How a write reaches the settled model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SetMode {
    /// Settle after the quiet window
    #[default]
    Debounced,
    /// Settle now ("commit" actions such as Enter or Apply)
    Immediate,
}

/// Consumer handle on a provider scope
///
/// Cheap to clone. Does not keep the scope alive: once the provider is torn
/// down every call returns `ScopeError::ScopeClosed`.
#[derive(Clone)]
pub struct FilterContext {
    scope: Weak<Scope>,
}

impl FilterContext {
    pub(crate) fn attach(scope: &Arc<Scope>) -> Self {
        Self {
            scope: Arc::downgrade(scope),
        }
    }

    pub(crate) fn detached() -> Self {
        Self { scope: Weak::new() }
    }

    fn scope(&self) -> Result<Arc<Scope>, ScopeError> {
        self.scope.upgrade().ok_or_else(|| {
            tracing::warn!("filter context used after its provider was torn down");
            ScopeError::ScopeClosed
        })
    }

    /// Settled value of `key`
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn get_filter(&self, key: &str) -> Result<Option<FilterValue>, ScopeError> {
        let scope = self.scope()?;
        Ok(scope.settled.with(|model| model.get(key).cloned()))
    }

    /// Settled value of `key` coerced into a list
    ///
    /// Absent keys give `[]`, scalars a single-element list, lists themselves.
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn get_filter_array(&self, key: &str) -> Result<Vec<FilterValue>, ScopeError> {
        let scope = self.scope()?;
        Ok(scope.settled.with(|model| ensure_array(model.get(key))))
    }

    /// Keys present in the settled model, in model order
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn active_keys(&self) -> Result<Vec<String>, ScopeError> {
        let scope = self.scope()?;
        Ok(scope
            .settled
            .with(|model| model.keys().map(str::to_owned).collect()))
    }

    /// Set `key` on the live model; the settled view follows after the window
    ///
    /// # Errors
    /// - `FilterError::Linker` if the linker refuses; nothing is applied
    /// - `FilterError::Scope` outside an active scope
    pub fn set_filter(&self, key: &str, value: impl Into<FilterValue>) -> Result<(), FilterError> {
        self.assign(key, Some(value.into()), SetMode::Debounced)
    }

    /// Set `key` on both the live and the settled model now
    ///
    /// # Errors
    /// - `FilterError::Linker` if the linker refuses; nothing is applied
    /// - `FilterError::Scope` outside an active scope
    pub fn set_filter_immediately(
        &self,
        key: &str,
        value: impl Into<FilterValue>,
    ) -> Result<(), FilterError> {
        self.assign(key, Some(value.into()), SetMode::Immediate)
    }

    /// Remove `key`
    ///
    /// # Errors
    /// Same as [`set_filter`](Self::set_filter)
    pub fn clear_filter(&self, key: &str, mode: SetMode) -> Result<(), FilterError> {
        self.assign(key, None, mode)
    }

    /// Assign `value` to `key` (`None` clears) under `mode`
    ///
    /// The linker expands the change first; if it fails, neither model is
    /// touched.
    ///
    /// # Errors
    /// - `FilterError::Linker` if the linker refuses
    /// - `FilterError::Scope` outside an active scope
    pub fn assign(
        &self,
        key: &str,
        value: Option<FilterValue>,
        mode: SetMode,
    ) -> Result<(), FilterError> {
        let scope = self.scope()?;
        let transform = resolve(scope.linker.as_deref(), key, value).map_err(|err| {
            tracing::warn!(key, error = %err, "linker refused filter update");
            err
        })?;

        if mode == SetMode::Immediate {
            scope
                .settled
                .force_with(|settled| transform.apply(settled).pruned())?;
        }

        let live = scope.store.update(&transform)?;
        scope.touched.store(true, Ordering::Release);
        tracing::debug!(key, ?mode, keys = live.len(), "filter updated");

        let caught_up = mode == SetMode::Immediate && scope.settled.with(|settled| *settled == live);
        if !caught_up {
            scope.settled.set(live)?;
        }
        Ok(())
    }

    /// Bind-nothing setter taking key and value per call
    #[must_use]
    pub fn setter(&self, mode: SetMode) -> FilterSetter {
        FilterSetter::new(self.clone(), mode)
    }

    /// Setter bound to `key`, taking the value per call
    #[must_use]
    pub fn key_setter(&self, key: impl Into<String>, mode: SetMode) -> KeySetter {
        KeySetter::new(self.clone(), key.into(), mode)
    }

    /// Setter bound to `value`, taking the key per call
    #[must_use]
    pub fn value_setter(&self, value: impl Into<FilterValue>, mode: SetMode) -> ValueSetter {
        ValueSetter::new(self.clone(), Some(value.into()), mode)
    }

    /// Snapshot of the live model
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn live_model(&self) -> Result<FilterModel, ScopeError> {
        Ok(self.scope()?.store.model())
    }

    /// Snapshot of the settled model
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn settled_model(&self) -> Result<FilterModel, ScopeError> {
        Ok(self.scope()?.settled.get())
    }

    /// Run `on_change` with every new settled model
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn subscribe_settled(
        &self,
        on_change: impl Fn(&FilterModel) + Send + Sync + 'static,
    ) -> Result<SubscriptionId, ScopeError> {
        Ok(self.scope()?.settled.subscribe(on_change))
    }

    /// Remove a settled-model callback
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn unsubscribe_settled(&self, id: SubscriptionId) -> Result<bool, ScopeError> {
        Ok(self.scope()?.settled.unsubscribe(id))
    }

    /// Receiver tracking the settled model
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn watch_settled(&self) -> Result<watch::Receiver<FilterModel>, ScopeError> {
        Ok(self.scope()?.settled.watch())
    }

    /// Current host query
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn location_query(&self) -> Result<LocationQuery, ScopeError> {
        Ok(self.scope()?.store.location_query())
    }

    /// Write a pending query sync now; returns whether one was pending
    ///
    /// # Errors
    /// Returns `ScopeError::ScopeClosed` outside an active scope
    pub fn flush_query(&self) -> Result<bool, ScopeError> {
        Ok(self.scope()?.store.flush())
    }

    /// Check whether the scope behind this handle is still open
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.scope.strong_count() > 0
    }
}

impl fmt::Debug for FilterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterContext")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinkerError;
    use crate::linker::{linker_fn, BaseSetter, DependentFilters, ModelTransform};
    use crate::location::UrlLocation;
    use crate::provider::FiltersProvider;
    use std::time::Duration;

    const SETTLE: Duration = Duration::from_millis(200);

    fn provider(query: &str) -> FiltersProvider {
        let location =
            Arc::new(UrlLocation::parse(&format!("https://designer.local/list?{query}")).unwrap());
        FiltersProvider::builder(location).init().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn reads_see_settled_model() {
        let provider = provider("a=1");
        let ctx = provider.context();

        ctx.set_filter("b", "2").unwrap();
        assert_eq!(ctx.get_filter("b").unwrap(), None);
        assert_eq!(ctx.live_model().unwrap().get("b"), Some(&FilterValue::from("2")));

        tokio::time::sleep(SETTLE + Duration::from_millis(1)).await;
        assert_eq!(ctx.get_filter("b").unwrap(), Some(FilterValue::from("2")));
        assert_eq!(ctx.active_keys().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_write_is_visible_at_once() {
        let provider = provider("");
        let ctx = provider.context();

        ctx.set_filter_immediately("q", "scenario").unwrap();
        assert_eq!(ctx.get_filter("q").unwrap(), Some(FilterValue::from("scenario")));
        assert_eq!(ctx.active_keys().unwrap(), vec!["q"]);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_write_applies_to_settled_view_only_its_own_change() {
        let provider = provider("");
        let ctx = provider.context();

        ctx.set_filter("typing", "abc").unwrap();
        ctx.set_filter_immediately("flag", true).unwrap();
        assert_eq!(ctx.active_keys().unwrap(), vec!["flag"]);

        tokio::time::sleep(SETTLE * 2).await;
        assert_eq!(ctx.active_keys().unwrap(), vec!["typing", "flag"]);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_and_array_reads() {
        let provider = provider("color=red&color=blue&name=x");
        let ctx = provider.context();

        assert_eq!(
            ctx.get_filter_array("color").unwrap(),
            vec![FilterValue::from("red"), FilterValue::from("blue")]
        );
        assert_eq!(ctx.get_filter_array("name").unwrap(), vec![FilterValue::from("x")]);
        assert!(ctx.get_filter_array("missing").unwrap().is_empty());

        ctx.clear_filter("name", SetMode::Immediate).unwrap();
        assert_eq!(ctx.get_filter("name").unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn linker_failure_leaves_models_untouched() {
        let location = Arc::new(UrlLocation::parse("https://designer.local/list?a=1").unwrap());
        let provider = FiltersProvider::builder(location)
            .with_linker(linker_fn(|_: &BaseSetter, key: &str, _: Option<&FilterValue>| {
                if key == "locked" {
                    Err(LinkerError::rejected(key, "read only"))
                } else {
                    Ok(None::<ModelTransform>)
                }
            }))
            .init()
            .unwrap();
        let ctx = provider.context();

        let err = ctx.set_filter_immediately("locked", "x").unwrap_err();
        assert!(matches!(err, FilterError::Linker(_)));
        assert!(!err.is_fatal());
        assert!(!ctx.live_model().unwrap().contains_key("locked"));
        assert!(!ctx.settled_model().unwrap().contains_key("locked"));

        ctx.set_filter("other", "y").unwrap();
        assert!(ctx.live_model().unwrap().contains_key("other"));
    }

    #[tokio::test(start_paused = true)]
    async fn dependent_filters_clear_on_set() {
        let location =
            Arc::new(UrlLocation::parse("https://designer.local/list?a=1&b=2").unwrap());
        let provider = FiltersProvider::builder(location)
            .with_linker(DependentFilters::new().clears("a", ["b"]))
            .init()
            .unwrap();
        let ctx = provider.context();

        ctx.set_filter("a", "x").unwrap();
        let live = ctx.live_model().unwrap();
        assert_eq!(live.get("a"), Some(&FilterValue::from("x")));
        assert!(!live.contains_key("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn detached_context_is_closed() {
        let mut provider = provider("a=1");
        let ctx = provider.context();
        assert!(ctx.is_attached());

        provider.teardown();
        assert!(!ctx.is_attached());
        assert!(matches!(
            ctx.set_filter("a", "2").unwrap_err(),
            FilterError::Scope(ScopeError::ScopeClosed)
        ));
        assert_eq!(ctx.flush_query().unwrap_err(), ScopeError::ScopeClosed);
    }
}
