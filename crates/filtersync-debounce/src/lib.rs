//! Filtersync Debounce
//!
//! Trailing-edge debounce primitives on the tokio timer.
//!
//! # Overview
//!
//! - **Debouncer**: single-slot timer; a new job supersedes the pending one
//! - **DebouncedValue**: settled view of a value that lags the source until
//!   it has been quiet for the window, with a bypass to settle at once
//! - **DebouncedSetter**: wraps a setter so bursts of calls coalesce into one
//!
//! Every primitive binds to the runtime current at construction and cancels
//! its timer when disposed or dropped, so no job fires after teardown.
//!
//! # Example
//!
//! ```rust
//! use filtersync_debounce::DebouncedValue;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> Result<(), filtersync_debounce::DebounceError> {
//! let value = DebouncedValue::new(0, Duration::from_millis(200))?;
//!
//! value.set(1)?;
//! value.set(2)?;
//! assert_eq!(value.get(), 0);
//!
//! tokio::time::sleep(Duration::from_millis(250)).await;
//! assert_eq!(value.get(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod setter;
pub mod timer;
pub mod value;

// Re-exports
pub use error::DebounceError;
pub use setter::DebouncedSetter;
pub use timer::Debouncer;
pub use value::{DebouncedValue, SubscriptionId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
