//! Filtersync Context
//!
//! Keeps a filter model in step with the page's location query and
//! separates provisional input from the committed, debounced model that
//! expensive consumers read.
//!
//! # Overview
//!
//! - **FiltersProvider**: explicitly scoped owner of one model instance
//! - **FilterContext**: consumer facade (`get_filter`, `set_filter`,
//!   `set_filter_immediately`, `active_keys`)
//! - **ValueLinker**: caller-supplied cross-filter rules
//! - **FiltersModelStore**: live model plus debounced query write-back
//! - **Location**: host address boundary
//!
//! Data flow: the provider decodes the location query once; setters expand
//! the change through the linker and update the live model; the live model
//! is re-encoded into the query after the short window and settles into the
//! model readers see after the long window.
//!
//! # Example
//!
//! ```rust
//! use filtersync_context::{FiltersProvider, UrlLocation};
//! use filtersync_model::FilterValue;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let location = Arc::new(UrlLocation::parse("https://designer.local/list?status=true")?);
//! let provider = FiltersProvider::builder(location.clone()).init()?;
//! let filters = provider.context();
//!
//! filters.set_filter_immediately("color", "green")?;
//! assert_eq!(filters.get_filter("color")?, Some(FilterValue::from("green")));
//!
//! tokio::time::sleep(std::time::Duration::from_millis(250)).await;
//! assert_eq!(location.href(), "https://designer.local/list?status=true&color=green");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod error;
pub mod linker;
pub mod location;
pub mod provider;
pub mod setter;
pub mod store;

// Re-exports for convenience
pub use config::FiltersConfig;
pub use context::{FilterContext, SetMode};
pub use error::{ConfigError, FilterError, LinkerError, ScopeError};
pub use linker::{linker_fn, BaseSetter, DependentFilters, FnLinker, ModelTransform, ValueLinker};
pub use location::{Location, UrlLocation};
pub use provider::{FiltersProvider, ProviderBuilder, ScopePhase};
pub use setter::{FilterSetter, KeySetter, ValueSetter};
pub use store::FiltersModelStore;

pub use filtersync_debounce::SubscriptionId;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with filter contexts
    pub use crate::{
        FilterContext, FilterError, FiltersConfig, FiltersProvider, Location, SetMode,
        UrlLocation, ValueLinker,
    };
    pub use filtersync_model::{FilterModel, FilterValue, LocationQuery};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
