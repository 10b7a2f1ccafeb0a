//! Value utility functions shared across modules
//!
//! Dotted-path access into document bodies and JSON value comparison for
//! sorting and range checks.

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Resolve a dotted field path against a document body.
///
/// Path segments are resolved left-to-right through nested objects only:
/// any non-object encountered mid-path yields `None`, and a `null` leaf is
/// reported as `None` as well (null values are never indexed or matched).
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use yaradb_core::value_utils::get_nested_value;
///
/// let body = json!({"address": {"city": "NYC"}});
/// let body = body.as_object().unwrap();
/// assert_eq!(get_nested_value(body, "address.city"), Some(&json!("NYC")));
/// assert_eq!(get_nested_value(body, "address.city.block"), None);
/// ```
pub fn get_nested_value<'a>(body: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut value = body.get(first)?;

    for part in parts {
        match value {
            Value::Object(map) => value = map.get(part)?,
            _ => return None,
        }
    }

    if value.is_null() {
        None
    } else {
        Some(value)
    }
}

/// Compare two JSON values of the same scalar type.
///
/// Returns `None` for mixed-type pairs and for non-scalar values; the
/// engine does not define a total order across types.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(n1), Value::Number(n2)) => {
            let f1 = n1.as_f64()?;
            let f2 = n2.as_f64()?;
            f1.partial_cmp(&f2)
        }
        (Value::String(s1), Value::String(s2)) => Some(s1.cmp(s2)),
        (Value::Bool(b1), Value::Bool(b2)) => Some(b1.cmp(b2)),
        _ => None,
    }
}

/// Sort comparator over optional field values.
///
/// Documents missing the field sort after present ones; incomparable pairs
/// compare Equal, which under a stable sort keeps their input order
/// deterministic.
pub fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(av), Some(bv)) => compare_values(av, bv).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_get_nested_value_simple() {
        let body = body(json!({"name": "Alice", "age": 30}));
        assert_eq!(get_nested_value(&body, "name"), Some(&json!("Alice")));
        assert_eq!(get_nested_value(&body, "age"), Some(&json!(30)));
        assert_eq!(get_nested_value(&body, "missing"), None);
    }

    #[test]
    fn test_get_nested_value_nested() {
        let body = body(json!({"address": {"city": "NYC", "zip": 10001}}));
        assert_eq!(get_nested_value(&body, "address.city"), Some(&json!("NYC")));
        assert_eq!(get_nested_value(&body, "address.missing"), None);
    }

    #[test]
    fn test_get_nested_value_non_map_mid_path() {
        let body = body(json!({"tags": ["a", "b"], "n": 5}));
        // Arrays and scalars are not traversed
        assert_eq!(get_nested_value(&body, "tags.0"), None);
        assert_eq!(get_nested_value(&body, "n.x"), None);
    }

    #[test]
    fn test_get_nested_value_null_leaf() {
        let body = body(json!({"a": null, "b": {"c": null}}));
        assert_eq!(get_nested_value(&body, "a"), None);
        assert_eq!(get_nested_value(&body, "b.c"), None);
    }

    #[test]
    fn test_compare_values_same_type() {
        assert_eq!(
            compare_values(&json!(10), &json!(5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_values(&json!(2.5), &json!(3.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_values(&json!("apple"), &json!("banana")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_values(&json!(true), &json!(false)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_compare_values_mixed_types() {
        assert_eq!(compare_values(&json!("a"), &json!(1)), None);
        assert_eq!(compare_values(&json!([1]), &json!([1])), None);
    }

    #[test]
    fn test_compare_for_sort_missing_last() {
        assert_eq!(compare_for_sort(None, Some(&json!(5))), Ordering::Greater);
        assert_eq!(compare_for_sort(Some(&json!(5)), None), Ordering::Less);
        assert_eq!(compare_for_sort(None, None), Ordering::Equal);
        assert_eq!(
            compare_for_sort(Some(&json!(1)), Some(&json!(2))),
            Ordering::Less
        );
    }
}
