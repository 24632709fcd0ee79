//! Filtersync Model
//!
//! Typed filter values, the filter model they live in, and the location
//! query codec that moves a model in and out of a page address.
//!
//! # Overview
//!
//! - **FilterValue**: scalar (`Bool`, `Text`) or list value of one filter
//! - **FilterModel**: insertion-ordered mapping of filter name to value
//! - **LocationQuery**: ordered key/value pairs of a URL query component
//! - **codec**: [`decode`] / [`encode`] between the two
//!
//! # Example
//!
//! ```rust
//! use filtersync_model::{decode, encode, FilterValue, LocationQuery};
//!
//! let query = LocationQuery::parse("?status=true&color=red&color=blue");
//! let model = decode(&query);
//!
//! assert_eq!(model.get("status"), Some(&FilterValue::Bool(true)));
//! assert_eq!(model.get("color"), Some(&FilterValue::from(vec!["red", "blue"])));
//! assert_eq!(encode(&model).to_string(), "status=true&color=red&color=blue");
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod model;
pub mod query;
pub mod value;

// Re-exports
pub use codec::{decode, encode, ensure_array};
pub use model::FilterModel;
pub use query::LocationQuery;
pub use value::FilterValue;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for model operations
    pub use crate::{decode, encode, ensure_array, FilterModel, FilterValue, LocationQuery};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
