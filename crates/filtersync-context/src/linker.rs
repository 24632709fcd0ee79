//! Value linking
//!
//! Provides [`ValueLinker`], the seam through which callers declare
//! cross-filter dependencies, and the transforms it composes.

use crate::error::LinkerError;
use filtersync_model::{FilterModel, FilterValue};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::sync::Arc;

/// Pure state transition `current model -> next model`
#[derive(Clone)]
pub struct ModelTransform(Arc<dyn Fn(&FilterModel) -> FilterModel + Send + Sync>);

impl ModelTransform {
    /// Wrap a transition function
    pub fn new(f: impl Fn(&FilterModel) -> FilterModel + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Transition that changes nothing
    #[must_use]
    pub fn identity() -> Self {
        Self::new(FilterModel::clone)
    }

    /// Compute the next model
    #[inline]
    #[must_use]
    pub fn apply(&self, model: &FilterModel) -> FilterModel {
        (self.0)(model)
    }

    /// Run `self`, then `next` on its result
    #[must_use]
    pub fn then(self, next: ModelTransform) -> Self {
        Self::new(move |model| next.apply(&self.apply(model)))
    }
}

impl fmt::Debug for ModelTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModelTransform")
    }
}

/// The plain setter handed to linkers
///
/// `set` assigns one key and prunes every falsy entry of the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseSetter;

impl BaseSetter {
    /// Transition assigning `value` to `key`; `None` clears the key
    #[must_use]
    pub fn set(&self, key: &str, value: Option<FilterValue>) -> ModelTransform {
        let key = key.to_owned();
        ModelTransform::new(move |current| {
            let mut next = current.clone();
            next.assign(&key, value.clone());
            next.pruned()
        })
    }

    /// Transition removing `key`
    #[inline]
    #[must_use]
    pub fn clear(&self, key: &str) -> ModelTransform {
        self.set(key, None)
    }
}

/// Caller-supplied cross-filter rule
///
/// Called on every update with the key and value being set. Returning
/// `Some(transform)` chains `transform` after the plain assignment;
/// `None` leaves the plain assignment alone. An `Err` aborts the update
/// before anything is applied.
pub trait ValueLinker: Send + Sync {
    /// Produce the transition implied by setting `key` to `value`
    ///
    /// # Errors
    /// Any `LinkerError` propagates out of the triggering setter call
    fn link(
        &self,
        setter: &BaseSetter,
        key: &str,
        value: Option<&FilterValue>,
    ) -> Result<Option<ModelTransform>, LinkerError>;
}

/// Linker built from a closure, see [`linker_fn`]
pub struct FnLinker<F>(F);

/// Turn a closure into a [`ValueLinker`]
pub fn linker_fn<F>(f: F) -> FnLinker<F>
where
    F: Fn(&BaseSetter, &str, Option<&FilterValue>) -> Result<Option<ModelTransform>, LinkerError>
        + Send
        + Sync,
{
    FnLinker(f)
}

impl<F> ValueLinker for FnLinker<F>
where
    F: Fn(&BaseSetter, &str, Option<&FilterValue>) -> Result<Option<ModelTransform>, LinkerError>
        + Send
        + Sync,
{
    fn link(
        &self,
        setter: &BaseSetter,
        key: &str,
        value: Option<&FilterValue>,
    ) -> Result<Option<ModelTransform>, LinkerError> {
        (self.0)(setter, key, value)
    }
}

impl<F> fmt::Debug for FnLinker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnLinker")
    }
}

/// Linker that clears dependent filters when their parent is set
///
/// Dependencies cascade: clearing a dependent that is itself a parent also
/// clears its own dependents.
#[derive(Debug, Clone, Default)]
pub struct DependentFilters {
    dependents: IndexMap<String, Vec<String>>,
}

impl DependentFilters {
    /// Create empty rule set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that setting `parent` clears `dependents`
    #[must_use]
    pub fn clears<I, S>(mut self, parent: impl Into<String>, dependents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependents
            .entry(parent.into())
            .or_default()
            .extend(dependents.into_iter().map(Into::into));
        self
    }

    /// Every key cleared when `parent` is set, in cascade order
    #[must_use]
    pub fn cleared_by(&self, parent: &str) -> Vec<String> {
        let mut seen = IndexSet::new();
        let mut stack = vec![parent.to_owned()];
        while let Some(key) = stack.pop() {
            for dependent in self.dependents.get(&key).into_iter().flatten() {
                if dependent != parent && seen.insert(dependent.clone()) {
                    stack.push(dependent.clone());
                }
            }
        }
        seen.into_iter().collect()
    }
}

impl ValueLinker for DependentFilters {
    fn link(
        &self,
        setter: &BaseSetter,
        key: &str,
        _value: Option<&FilterValue>,
    ) -> Result<Option<ModelTransform>, LinkerError> {
        let cleared = self.cleared_by(key);
        if cleared.is_empty() {
            return Ok(None);
        }
        let transform = cleared
            .iter()
            .map(|dependent| setter.clear(dependent))
            .fold(ModelTransform::identity(), ModelTransform::then);
        Ok(Some(transform))
    }
}

/// Build the transition for one setter call
///
/// # Errors
/// Propagates the linker's error; nothing has been applied at that point
pub(crate) fn resolve(
    linker: Option<&dyn ValueLinker>,
    key: &str,
    value: Option<FilterValue>,
) -> Result<ModelTransform, LinkerError> {
    let setter = BaseSetter;
    let linked = match linker {
        Some(linker) => linker.link(&setter, key, value.as_ref())?,
        None => None,
    };
    let base = setter.set(key, value);
    Ok(match linked {
        Some(linked) => base.then(linked),
        None => base,
    })
}
