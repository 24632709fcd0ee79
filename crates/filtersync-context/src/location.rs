//! Location boundary
//!
//! Provides the [`Location`] trait through which the engine reads the host's
//! query at mount and writes it back with replace navigation.

use filtersync_model::LocationQuery;
use parking_lot::Mutex;
use std::fmt;
use url::Url;

/// Host page address
///
/// `replace_query` must not create a new browsable history entry.
pub trait Location: Send + Sync {
    /// Current query pairs
    fn query(&self) -> LocationQuery;

    /// Rewrite the query in place
    fn replace_query(&self, query: LocationQuery);
}

impl fmt::Debug for dyn Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("query", &self.query().to_string())
            .finish()
    }
}

/// In-process location backed by a [`Url`]
#[derive(Debug)]
pub struct UrlLocation {
    url: Mutex<Url>,
}

impl UrlLocation {
    /// Wrap a parsed URL
    #[inline]
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url: Mutex::new(url),
        }
    }

    /// Parse an absolute URL
    ///
    /// # Errors
    /// Returns the parser error for a malformed address
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self::new)
    }

    /// Full address as currently shown
    #[must_use]
    pub fn href(&self) -> String {
        self.url.lock().to_string()
    }
}

impl Location for UrlLocation {
    fn query(&self) -> LocationQuery {
        self.url
            .lock()
            .query()
            .map(LocationQuery::parse)
            .unwrap_or_default()
    }

    fn replace_query(&self, query: LocationQuery) {
        let mut url = self.url.lock();
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&query.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_replaces_query() {
        let location = UrlLocation::parse("https://designer.local/scenarios?status=true").unwrap();
        assert_eq!(location.query(), LocationQuery::parse("status=true"));

        location.replace_query(LocationQuery::parse("color=red&color=blue"));
        assert_eq!(
            location.href(),
            "https://designer.local/scenarios?color=red&color=blue"
        );

        location.replace_query(LocationQuery::new());
        assert_eq!(location.href(), "https://designer.local/scenarios");
    }
}
