//! Query codec
//!
//! Stateless translation between a [`LocationQuery`] and a [`FilterModel`].
//! The round trip is lossless for unique truthy scalars; it is not
//! bit-exact for lists (duplicate handling below) or for `Text("true")`.

use crate::model::FilterModel;
use crate::query::LocationQuery;
use crate::value::FilterValue;

/// Decode a location query into a filter model
///
/// Pairs are folded in encounter order:
/// - the first truthy value seen for a key is stored as is,
/// - a later value that differs from a stored scalar turns the entry into a
///   list of both,
/// - a later value equal to a stored scalar is ignored,
/// - once the entry is a list, every later value is appended,
/// - a stored falsy value (`?a=&a=x`) is replaced by the later one.
///
/// Decoding never fails and does not prune.
#[must_use]
pub fn decode(query: &LocationQuery) -> FilterModel {
    let mut model = FilterModel::new();
    for (key, raw) in query.iter() {
        merge_decoded(&mut model, key, FilterValue::from_query_value(raw));
    }
    model
}

fn merge_decoded(model: &mut FilterModel, key: &str, value: FilterValue) {
    let occupied = model
        .get(key)
        .is_some_and(|existing| existing.is_list() || existing.is_truthy());

    if !occupied {
        model.insert(key, value);
        return;
    }

    if let Some(existing) = model.get_mut(key) {
        match existing {
            FilterValue::List(items) => items.push(value),
            scalar if *scalar != value => {
                let first = std::mem::replace(scalar, FilterValue::List(Vec::new()));
                *scalar = FilterValue::List(vec![first, value]);
            }
            _ => {}
        }
    }
}

/// Encode a filter model into a location query
///
/// Entries are emitted in model order; a list emits one pair per element.
/// The codec does not filter: falsy entries must have been pruned already.
#[must_use]
pub fn encode(model: &FilterModel) -> LocationQuery {
    model
        .iter()
        .flat_map(|(key, value)| {
            value
                .to_query_values()
                .into_iter()
                .map(move |raw| (key.to_owned(), raw))
        })
        .collect()
}

/// Coerce an optional value into a list
///
/// Absent or falsy values give an empty list, lists give their elements and
/// scalars give a single-element list.
#[must_use]
pub fn ensure_array(value: Option<&FilterValue>) -> Vec<FilterValue> {
    match value {
        Some(value) if value.is_truthy() => match value {
            FilterValue::List(items) => items.clone(),
            scalar => vec![scalar.clone()],
        },
        _ => Vec::new(),
    }
}
