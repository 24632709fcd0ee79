//! Location query
//!
//! Provides [`LocationQuery`], the ordered key/value pairs of a URL query
//! component. Keys may repeat; repeated keys carry array-valued filters.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

/// Ordered query pairs as found in a page address
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocationQuery {
    pairs: Vec<(String, String)>,
}

impl LocationQuery {
    /// Create empty query
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string (`a=1&b=2`), with or without a leading `?`
    ///
    /// Parsing never fails: percent-escapes that do not decode are kept
    /// as they are.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.strip_prefix('?').unwrap_or(input);
        form_urlencoded::parse(input.as_bytes()).into_owned().collect()
    }

    /// Append a pair
    #[inline]
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Pairs in encounter order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Borrow the raw pairs
    #[inline]
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// All values recorded for `key`, in encounter order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().filter(move |(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Number of pairs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check for an empty query
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish();
        f.write_str(&encoded)
    }
}

impl FromStr for LocationQuery {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocationQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order_and_repeats() {
        let query = LocationQuery::parse("?status=true&color=red&color=blue");
        assert_eq!(query.len(), 3);
        assert_eq!(query.get_all("color").collect::<Vec<_>>(), vec!["red", "blue"]);
        assert_eq!(query.to_string(), "status=true&color=red&color=blue");
    }

    #[test]
    fn parse_decodes_escapes() {
        let query = LocationQuery::parse("name=a+b%20c&broken=%zz");
        assert_eq!(
            query.pairs(),
            &[
                ("name".to_string(), "a b c".to_string()),
                ("broken".to_string(), "%zz".to_string()),
            ]
        );
    }

    #[test]
    fn empty_input() {
        assert!(LocationQuery::parse("").is_empty());
        assert!(LocationQuery::parse("?").is_empty());
        assert_eq!(LocationQuery::new().to_string(), "");
    }

    #[test]
    fn display_escapes_reserved_characters() {
        let query: LocationQuery = [("q", "a&b=c")].into_iter().collect();
        assert_eq!(query.to_string(), "q=a%26b%3Dc");
        assert_eq!(LocationQuery::parse(&query.to_string()), query);
    }
}
