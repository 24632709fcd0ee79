//! Filter values
//!
//! Provides [`FilterValue`], the value held by one named filter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Query literal that decodes to [`FilterValue::Bool`]`(true)`
pub const TRUE_LITERAL: &str = "true";

/// Value of a single filter
///
/// Scalars are booleans or strings; array-valued filters hold a list of
/// scalars. A value is *truthy* when it is `Bool(true)`, a non-empty
/// `Text`, or a non-empty `List`. Falsy values never survive a model
/// update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean flag (`?flag=true`)
    Bool(bool),

    /// Free-form string
    Text(String),

    /// Multi-valued filter, encoded as repeated query keys
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Build a list value from anything convertible into values
    #[inline]
    #[must_use]
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Coerce a raw query value
    ///
    /// The literal `"true"` becomes `Bool(true)`; everything else is kept
    /// verbatim as `Text`, malformed input included.
    #[must_use]
    pub fn from_query_value(raw: &str) -> Self {
        if raw == TRUE_LITERAL {
            Self::Bool(true)
        } else {
            Self::Text(raw.to_owned())
        }
    }

    /// Check whether the value counts as set
    #[inline]
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Text(text) => !text.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Check for a list value
    #[inline]
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Borrow the text of a `Text` value
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the flag of a `Bool` value
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Borrow the items of a `List` value
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Query-string form of this value, one string per emitted pair
    ///
    /// Nested lists are flattened.
    #[must_use]
    pub fn to_query_values(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_query_values(&mut out);
        out
    }

    fn collect_query_values(&self, out: &mut Vec<String>) {
        match self {
            Self::Bool(flag) => out.push(flag.to_string()),
            Self::Text(text) => out.push(text.clone()),
            Self::List(items) => {
                for item in items {
                    item.collect_query_values(out);
                }
            }
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Text(text) => f.write_str(text),
            Self::List(_) => f.write_str(&self.to_query_values().join(",")),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<&str> for FilterValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<V: Into<FilterValue>> From<Vec<V>> for FilterValue {
    fn from(items: Vec<V>) -> Self {
        Self::list(items)
    }
}
