//! Error types for the debounce primitives

/// Errors raised when scheduling debounced work
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DebounceError {
    /// Constructed outside a tokio runtime
    #[error("no tokio runtime is running on this thread")]
    NoRuntime,

    /// The primitive was disposed; nothing may be scheduled any more
    #[error("debounce timer has been disposed")]
    Disposed,
}
