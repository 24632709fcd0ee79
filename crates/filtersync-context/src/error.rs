//! Error types for the filter context
//!
//! Provides error handling for:
//! - Calls into a provider scope that no longer exists
//! - Caller-supplied linkers refusing an update
//! - Invalid configuration
//! - Timer runtime problems

use filtersync_debounce::DebounceError;
use std::path::PathBuf;

/// Main filter context error type
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Accessor used outside an active provider scope
    #[error("scope error: {0}")]
    Scope(#[from] ScopeError),

    /// Linker refused the update; the model was left untouched
    #[error("linker error: {0}")]
    Linker(#[from] LinkerError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No timer runtime available
    #[error("runtime error: {0}")]
    Runtime(DebounceError),
}

impl FilterError {
    /// Check if the error reveals a wiring mistake rather than a local failure
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Scope(_) | Self::Runtime(_))
    }
}

impl From<DebounceError> for FilterError {
    fn from(err: DebounceError) -> Self {
        match err {
            // Timers are only disposed by teardown
            DebounceError::Disposed => Self::Scope(ScopeError::ScopeClosed),
            DebounceError::NoRuntime => Self::Runtime(err),
        }
    }
}

/// Scope errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// The provider was torn down (or never outlived this handle)
    #[error("filter context used outside an active provider scope")]
    ScopeClosed,
}

/// Errors raised by a [`ValueLinker`](crate::ValueLinker)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkerError {
    /// The linker refuses this key/value combination
    #[error("linker rejected `{key}`: {reason}")]
    Rejected {
        /// Filter key being set
        key: String,
        /// Why the linker refused
        reason: String,
    },

    /// Any other linker failure
    #[error("linker failed: {0}")]
    Other(String),
}

impl LinkerError {
    /// Create a rejection for `key`
    pub fn rejected(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A window must be longer than zero
    #[error("{name} must be greater than zero")]
    InvalidWindow {
        /// Config field holding the zero window
        name: &'static str,
    },

    /// The address bar must not lag behind the settled view
    #[error("query sync window ({query_sync_ms}ms) exceeds settle window ({settle_ms}ms)")]
    WindowOrder {
        /// Configured query sync window
        query_sync_ms: u64,
        /// Configured settle window
        settle_ms: u64,
    },

    /// Malformed TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
