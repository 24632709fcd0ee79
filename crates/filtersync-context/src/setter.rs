//! Partially applied setters
//!
//! Named forms of the filter setter for handing to UI callbacks:
//! - [`FilterSetter`]: nothing bound, `set(key, value)`
//! - [`KeySetter`]: key bound, `set(value)`
//! - [`ValueSetter`]: value bound, `apply(key)`
//!
//! All of them behave exactly like [`FilterContext::assign`].

use crate::context::{FilterContext, SetMode};
use crate::error::FilterError;
use filtersync_model::FilterValue;

/// Setter with nothing bound
#[derive(Debug, Clone)]
pub struct FilterSetter {
    context: FilterContext,
    mode: SetMode,
}

impl FilterSetter {
    pub(crate) fn new(context: FilterContext, mode: SetMode) -> Self {
        Self { context, mode }
    }

    /// Set `key` to `value`
    ///
    /// # Errors
    /// See [`FilterContext::assign`]
    pub fn set(&self, key: &str, value: impl Into<FilterValue>) -> Result<(), FilterError> {
        self.context.assign(key, Some(value.into()), self.mode)
    }

    /// Clear `key`
    ///
    /// # Errors
    /// See [`FilterContext::assign`]
    pub fn clear(&self, key: &str) -> Result<(), FilterError> {
        self.context.assign(key, None, self.mode)
    }

    /// Bind a key
    #[must_use]
    pub fn bind(&self, key: impl Into<String>) -> KeySetter {
        KeySetter::new(self.context.clone(), key.into(), self.mode)
    }

    /// Mode this setter writes with
    #[inline]
    #[must_use]
    pub fn mode(&self) -> SetMode {
        self.mode
    }
}

/// Setter bound to one key
#[derive(Debug, Clone)]
pub struct KeySetter {
    context: FilterContext,
    key: String,
    mode: SetMode,
}

impl KeySetter {
    pub(crate) fn new(context: FilterContext, key: String, mode: SetMode) -> Self {
        Self { context, key, mode }
    }

    /// Set the bound key to `value`
    ///
    /// # Errors
    /// See [`FilterContext::assign`]
    pub fn set(&self, value: impl Into<FilterValue>) -> Result<(), FilterError> {
        self.context.assign(&self.key, Some(value.into()), self.mode)
    }

    /// Clear the bound key
    ///
    /// # Errors
    /// See [`FilterContext::assign`]
    pub fn clear(&self) -> Result<(), FilterError> {
        self.context.assign(&self.key, None, self.mode)
    }

    /// Bound key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Setter bound to one value
#[derive(Debug, Clone)]
pub struct ValueSetter {
    context: FilterContext,
    value: Option<FilterValue>,
    mode: SetMode,
}

impl ValueSetter {
    pub(crate) fn new(context: FilterContext, value: Option<FilterValue>, mode: SetMode) -> Self {
        Self {
            context,
            value,
            mode,
        }
    }

    /// Set `key` to the bound value
    ///
    /// # Errors
    /// See [`FilterContext::assign`]
    pub fn apply(&self, key: &str) -> Result<(), FilterError> {
        self.context.assign(key, self.value.clone(), self.mode)
    }
}

#[cfg(test)]
mod tests {
    use crate::context::SetMode;
    use crate::location::UrlLocation;
    use crate::provider::FiltersProvider;
    use filtersync_model::FilterValue;
    use std::sync::Arc;

    fn provider() -> FiltersProvider {
        let location = Arc::new(UrlLocation::parse("https://designer.local/list").unwrap());
        FiltersProvider::builder(location).init().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn all_conventions_write_the_same_model() {
        let provider = provider();
        let ctx = provider.context();

        ctx.set_filter_immediately("a", "x").unwrap();
        let full = ctx.settled_model().unwrap();
        ctx.clear_filter("a", SetMode::Immediate).unwrap();

        ctx.setter(SetMode::Immediate).set("a", "x").unwrap();
        assert_eq!(ctx.settled_model().unwrap(), full);
        ctx.setter(SetMode::Immediate).clear("a").unwrap();

        ctx.key_setter("a", SetMode::Immediate).set("x").unwrap();
        assert_eq!(ctx.settled_model().unwrap(), full);
        ctx.key_setter("a", SetMode::Immediate).clear().unwrap();

        ctx.value_setter("x", SetMode::Immediate).apply("a").unwrap();
        assert_eq!(ctx.settled_model().unwrap(), full);
    }

    #[tokio::test(start_paused = true)]
    async fn bound_setter_uses_its_mode() {
        let provider = provider();
        let ctx = provider.context();

        let debounced = ctx.setter(SetMode::Debounced).bind("status");
        assert_eq!(debounced.key(), "status");
        debounced.set(true).unwrap();
        assert_eq!(ctx.get_filter("status").unwrap(), None);
        assert_eq!(
            ctx.live_model().unwrap().get("status"),
            Some(&FilterValue::Bool(true))
        );
    }
}
