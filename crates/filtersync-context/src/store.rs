//! Filters model store
//!
//! Owns the live filter model. Seeded once from the location query; every
//! update is mirrored back into the query after a short quiet window, using
//! replace navigation.

use crate::error::{FilterError, ScopeError};
use crate::linker::ModelTransform;
use crate::location::Location;
use filtersync_debounce::DebouncedSetter;
use filtersync_model::{decode, encode, FilterModel, LocationQuery};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Live filter model plus the query write-back
#[derive(Debug)]
pub struct FiltersModelStore {
    model: Mutex<FilterModel>,
    query_sync: DebouncedSetter<LocationQuery>,
    location: Arc<dyn Location>,
}

impl FiltersModelStore {
    /// Seed the model from `location` and schedule the first write-back
    ///
    /// The seeded model is decoded as is; an empty query gives an empty
    /// model.
    ///
    /// # Errors
    /// Returns `FilterError::Runtime` outside a tokio runtime
    pub fn initialize(
        location: Arc<dyn Location>,
        query_sync_window: Duration,
    ) -> Result<Self, FilterError> {
        let model = decode(&location.query());
        tracing::debug!(keys = model.len(), "filter model seeded from location");

        let target = Arc::clone(&location);
        let query_sync = DebouncedSetter::new(
            move |query: LocationQuery| {
                if target.query() == query {
                    tracing::trace!("location query already in sync");
                    return;
                }
                tracing::debug!(query = %query, "replacing location query");
                target.replace_query(query);
            },
            query_sync_window,
        )?;

        let store = Self {
            model: Mutex::new(model),
            query_sync,
            location,
        };
        store.query_sync.call(encode(&store.model()))?;
        Ok(store)
    }

    /// Snapshot of the live model
    #[must_use]
    pub fn model(&self) -> FilterModel {
        self.model.lock().clone()
    }

    /// Apply `transform` to the live model, prune it, and schedule a sync
    ///
    /// # Errors
    /// Returns `FilterError::Scope` once the store was disposed
    pub fn update(&self, transform: &ModelTransform) -> Result<FilterModel, FilterError> {
        if self.query_sync.is_disposed() {
            return Err(ScopeError::ScopeClosed.into());
        }
        let next = {
            let mut model = self.model.lock();
            let next = transform.apply(&model).pruned();
            model.clone_from(&next);
            next
        };
        self.query_sync.call(encode(&next))?;
        Ok(next)
    }

    /// Write a pending query sync now; returns whether one was pending
    pub fn flush(&self) -> bool {
        self.query_sync.flush()
    }

    /// Check whether a query sync is waiting
    #[inline]
    #[must_use]
    pub fn is_sync_pending(&self) -> bool {
        self.query_sync.is_pending()
    }

    /// Current host query
    #[must_use]
    pub fn location_query(&self) -> LocationQuery {
        self.location.query()
    }

    /// Cancel the pending sync and refuse further updates
    pub fn dispose(&self) {
        self.query_sync.dispose();
    }
}
