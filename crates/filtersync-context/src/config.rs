//! Filter context configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Debounce windows of a provider scope
///
/// ```toml
/// settle_window_ms = 200
/// query_sync_window_ms = 100
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FiltersConfig {
    /// Lag of the settled model behind the live model
    pub settle_window_ms: u64,
    /// Lag of the location query behind the live model
    pub query_sync_window_ms: u64,
}

impl FiltersConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With settle window
    #[inline]
    #[must_use]
    pub fn with_settle_window(mut self, window: Duration) -> Self {
        self.settle_window_ms = duration_ms(window);
        self
    }

    /// With query sync window
    #[inline]
    #[must_use]
    pub fn with_query_sync_window(mut self, window: Duration) -> Self {
        self.query_sync_window_ms = duration_ms(window);
        self
    }

    /// Settle window as a duration
    #[inline]
    #[must_use]
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }

    /// Query sync window as a duration
    #[inline]
    #[must_use]
    pub fn query_sync_window(&self) -> Duration {
        Duration::from_millis(self.query_sync_window_ms)
    }

    /// Check the windows
    ///
    /// # Errors
    /// - `ConfigError::InvalidWindow` for a zero window
    /// - `ConfigError::WindowOrder` if the query would sync after the settle
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settle_window_ms == 0 {
            return Err(ConfigError::InvalidWindow {
                name: "settle_window_ms",
            });
        }
        if self.query_sync_window_ms == 0 {
            return Err(ConfigError::InvalidWindow {
                name: "query_sync_window_ms",
            });
        }
        if self.query_sync_window_ms > self.settle_window_ms {
            return Err(ConfigError::WindowOrder {
                query_sync_ms: self.query_sync_window_ms,
                settle_ms: self.settle_window_ms,
            });
        }
        Ok(())
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns `ConfigError` on malformed input or invalid windows
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            settle_window_ms: 200,
            query_sync_window_ms: 100,
        }
    }
}

fn duration_ms(window: Duration) -> u64 {
    u64::try_from(window.as_millis()).unwrap_or(u64::MAX)
}
