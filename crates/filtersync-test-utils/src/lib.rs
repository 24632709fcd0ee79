//! Testing utilities for the filtersync workspace
//!
//! Shared test helpers, fixtures, and an in-memory history.

#![allow(missing_docs)]

use filtersync_context::{
    linker_fn, FilterError, FiltersConfig, FiltersProvider, LinkerError, Location, ValueLinker,
};
use filtersync_model::{FilterModel, FilterValue, LocationQuery};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Slack added on top of a debounce window when waiting for it to fire
pub const TIMER_SLACK: Duration = Duration::from_millis(5);

/// Browser-like history that records every navigation
///
/// `push` adds a history entry; `replace_query` rewrites the current one.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    state: Mutex<HistoryState>,
}

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<LocationQuery>,
    replaced: Vec<LocationQuery>,
}

impl MemoryHistory {
    pub fn new(query: &str) -> Self {
        Self {
            state: Mutex::new(HistoryState {
                entries: vec![LocationQuery::parse(query)],
                replaced: Vec::new(),
            }),
        }
    }

    pub fn shared(query: &str) -> Arc<Self> {
        Arc::new(Self::new(query))
    }

    /// Navigate to a new entry, as a link click would
    pub fn push(&self, query: &str) {
        self.state.lock().entries.push(LocationQuery::parse(query));
    }

    pub fn entries_len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn replace_count(&self) -> usize {
        self.state.lock().replaced.len()
    }

    /// Every query written through `replace_query`, oldest first
    pub fn replaced(&self) -> Vec<LocationQuery> {
        self.state.lock().replaced.clone()
    }

    pub fn current(&self) -> String {
        self.query().to_string()
    }
}

impl Location for MemoryHistory {
    fn query(&self) -> LocationQuery {
        self.state.lock().entries.last().cloned().unwrap_or_default()
    }

    fn replace_query(&self, query: LocationQuery) {
        let mut state = self.state.lock();
        match state.entries.last_mut() {
            Some(current) => *current = query.clone(),
            None => state.entries.push(query.clone()),
        }
        state.replaced.push(query);
    }
}

pub fn model(pairs: &[(&str, FilterValue)]) -> FilterModel {
    pairs
        .iter()
        .map(|(key, value)| (*key, value.clone()))
        .collect()
}

pub fn list(values: &[&str]) -> FilterValue {
    FilterValue::List(values.iter().map(|v| FilterValue::from(*v)).collect())
}

/// Linker clearing `dependent` whenever `parent` is set
pub fn clear_on_set(parent: &'static str, dependent: &'static str) -> impl ValueLinker {
    linker_fn(move |setter, key, _value| {
        Ok((key == parent).then(|| setter.clear(dependent)))
    })
}

/// Linker refusing every update of `key`
pub fn reject_key(key: &'static str) -> impl ValueLinker {
    linker_fn(move |_setter, updated, _value| {
        if updated == key {
            Err(LinkerError::rejected(updated, "locked"))
        } else {
            Ok(None)
        }
    })
}

pub fn setup_provider(
    history: &Arc<MemoryHistory>,
    linker: Option<Arc<dyn ValueLinker>>,
) -> Result<FiltersProvider, FilterError> {
    FiltersProvider::init(history.clone(), linker, FiltersConfig::default())
}

/// Wait long enough for every window of `config` to fire
pub async fn settle(config: &FiltersConfig) {
    tokio::time::sleep(config.settle_window().max(config.query_sync_window()) + TIMER_SLACK).await;
}
