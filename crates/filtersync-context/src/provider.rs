//! Provider scope
//!
//! Provides [`FiltersProvider`], the explicitly constructed owner of one
//! filter model instance. Lifecycle:
//!
//! ```text
//! Uninitialized -> Seeded -> { LiveUpdated <-> Settled } -> TornDown
//! ```
//!
//! Consumers get [`FilterContext`] handles from [`FiltersProvider::context`];
//! a handle outliving its provider reports `ScopeError::ScopeClosed`.

use crate::config::FiltersConfig;
use crate::context::FilterContext;
use crate::error::FilterError;
use crate::linker::ValueLinker;
use crate::location::Location;
use crate::store::FiltersModelStore;
use filtersync_debounce::DebouncedValue;
use filtersync_model::FilterModel;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle phase of a provider scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopePhase {
    /// Decoded from the location, nothing set yet
    Seeded,
    /// The live model is ahead of the settled model
    LiveUpdated,
    /// The settled model caught up with the live model
    Settled,
    /// Torn down; every handle is closed
    TornDown,
}

/// State shared by a provider and its context handles
pub(crate) struct Scope {
    pub(crate) store: FiltersModelStore,
    pub(crate) settled: DebouncedValue<FilterModel>,
    pub(crate) linker: Option<Arc<dyn ValueLinker>>,
    pub(crate) config: FiltersConfig,
    pub(crate) touched: AtomicBool,
}

impl Scope {
    fn dispose(&self) {
        self.store.dispose();
        self.settled.dispose();
    }

    fn phase(&self) -> ScopePhase {
        if !self.touched.load(Ordering::Acquire) {
            return ScopePhase::Seeded;
        }
        let live = self.store.model();
        if self.settled.with(|settled| *settled == live) {
            ScopePhase::Settled
        } else {
            ScopePhase::LiveUpdated
        }
    }
}

/// Builder for [`FiltersProvider`]
pub struct ProviderBuilder {
    location: Arc<dyn Location>,
    linker: Option<Arc<dyn ValueLinker>>,
    config: FiltersConfig,
}

impl ProviderBuilder {
    /// With a cross-filter linker
    #[must_use]
    pub fn with_linker(mut self, linker: impl ValueLinker + 'static) -> Self {
        self.linker = Some(Arc::new(linker));
        self
    }

    /// With a shared cross-filter linker
    #[must_use]
    pub fn with_shared_linker(mut self, linker: Arc<dyn ValueLinker>) -> Self {
        self.linker = Some(linker);
        self
    }

    /// With debounce windows
    #[must_use]
    pub fn with_config(mut self, config: FiltersConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the model and start the scope
    ///
    /// # Errors
    /// - `FilterError::Config` for invalid windows
    /// - `FilterError::Runtime` outside a tokio runtime
    pub fn init(self) -> Result<FiltersProvider, FilterError> {
        FiltersProvider::init(self.location, self.linker, self.config)
    }
}

/// Owner of one filter model instance
///
/// Dropping the provider tears it down.
pub struct FiltersProvider {
    scope: Option<Arc<Scope>>,
}

impl FiltersProvider {
    /// Start building a provider over `location`
    #[must_use]
    pub fn builder(location: Arc<dyn Location>) -> ProviderBuilder {
        ProviderBuilder {
            location,
            linker: None,
            config: FiltersConfig::default(),
        }
    }

    /// Seed the model from `location` and start the scope
    ///
    /// # Errors
    /// - `FilterError::Config` for invalid windows
    /// - `FilterError::Runtime` outside a tokio runtime
    pub fn init(
        location: Arc<dyn Location>,
        linker: Option<Arc<dyn ValueLinker>>,
        config: FiltersConfig,
    ) -> Result<Self, FilterError> {
        config.validate()?;

        let store = FiltersModelStore::initialize(location, config.query_sync_window())?;
        let settled = DebouncedValue::new(store.model(), config.settle_window())?;
        tracing::debug!(
            settle_ms = config.settle_window_ms,
            query_sync_ms = config.query_sync_window_ms,
            linked = linker.is_some(),
            "filter scope initialized"
        );

        Ok(Self {
            scope: Some(Arc::new(Scope {
                store,
                settled,
                linker,
                config,
                touched: AtomicBool::new(false),
            })),
        })
    }

    /// Hand out a consumer handle
    #[must_use]
    pub fn context(&self) -> FilterContext {
        match &self.scope {
            Some(scope) => FilterContext::attach(scope),
            None => FilterContext::detached(),
        }
    }

    /// Current lifecycle phase
    #[must_use]
    pub fn phase(&self) -> ScopePhase {
        self.scope
            .as_ref()
            .map_or(ScopePhase::TornDown, |scope| scope.phase())
    }

    /// Check whether the scope is still open
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.scope.is_some()
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> Option<FiltersConfig> {
        self.scope.as_ref().map(|scope| scope.config)
    }

    /// Cancel every pending timer and close all handles
    ///
    /// Idempotent. Nothing scheduled before teardown fires afterwards.
    pub fn teardown(&mut self) {
        if let Some(scope) = self.scope.take() {
            scope.dispose();
            tracing::debug!("filter scope torn down");
        }
    }
}

impl Drop for FiltersProvider {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for FiltersProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiltersProvider")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ProviderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBuilder")
            .field("linked", &self.linker.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScopeError;
    use crate::location::UrlLocation;
    use std::time::Duration;

    fn location(query: &str) -> Arc<UrlLocation> {
        Arc::new(UrlLocation::parse(&format!("https://designer.local/list?{query}")).unwrap())
    }

    #[test]
    fn init_outside_runtime_fails() {
        let err = FiltersProvider::builder(location("a=1")).init().unwrap_err();
        assert!(matches!(err, FilterError::Runtime(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn init_rejects_invalid_config() {
        let config = FiltersConfig::new().with_query_sync_window(Duration::from_secs(1));
        let err = FiltersProvider::builder(location("a=1"))
            .with_config(config)
            .init()
            .unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn shared_linker_and_config_are_kept() {
        let linker: Arc<dyn ValueLinker> =
            Arc::new(crate::linker::DependentFilters::new().clears("a", ["b"]));
        let config = FiltersConfig::new().with_settle_window(Duration::from_millis(300));
        let mut provider = FiltersProvider::builder(location("a=1&b=2"))
            .with_shared_linker(Arc::clone(&linker))
            .with_config(config)
            .init()
            .unwrap();
        assert_eq!(provider.config(), Some(config));

        provider.context().set_filter_immediately("a", "3").unwrap();
        assert_eq!(provider.context().active_keys().unwrap(), vec!["a"]);

        provider.teardown();
        assert_eq!(provider.config(), None);
        assert_eq!(Arc::strong_count(&linker), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn phases_follow_updates() {
        let mut provider = FiltersProvider::builder(location("a=1")).init().unwrap();
        let ctx = provider.context();
        assert_eq!(provider.phase(), ScopePhase::Seeded);

        ctx.set_filter("b", "2").unwrap();
        assert_eq!(provider.phase(), ScopePhase::LiveUpdated);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(provider.phase(), ScopePhase::Settled);

        provider.teardown();
        provider.teardown();
        assert_eq!(provider.phase(), ScopePhase::TornDown);
        assert!(!provider.is_active());
        assert_eq!(ctx.get_filter("a").unwrap_err(), ScopeError::ScopeClosed);
        assert_eq!(provider.context().active_keys().unwrap_err(), ScopeError::ScopeClosed);
    }
}
