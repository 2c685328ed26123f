// ABOUTME: Shared argument access and JSON value utilities for helper implementations
// ABOUTME: Covers truthiness, text conversion, dot-path lookup, ordering, slicing and de-duplication

use handlebars::Helper;
use serde_json::{Map, Value as JsonValue};
use std::cmp::Ordering;
use std::ops::Range;

/// Positional argument, with missing or `null` values treated as absent.
pub(crate) fn arg<'a>(h: &'a Helper<'_, '_>, idx: usize) -> Option<&'a JsonValue> {
    h.param(idx).map(|p| p.value()).filter(|v| !v.is_null())
}

/// Positional argument as a string slice.
pub(crate) fn str_arg<'a>(h: &'a Helper<'_, '_>, idx: usize) -> Option<&'a str> {
    arg(h, idx).and_then(|v| v.as_str())
}

/// Hash argument, with `null` treated as absent.
pub(crate) fn hash_arg<'a>(h: &'a Helper<'_, '_>, key: &str) -> Option<&'a JsonValue> {
    h.hash_get(key).map(|p| p.value()).filter(|v| !v.is_null())
}

/// True when the hash argument is present and truthy.
pub(crate) fn hash_flag(h: &Helper<'_, '_>, key: &str) -> bool {
    hash_arg(h, key).map(is_truthy).unwrap_or(false)
}

/// All hash arguments collected into a JSON object.
pub(crate) fn hash_object(h: &Helper<'_, '_>) -> JsonValue {
    let map: Map<String, JsonValue> = h
        .hash()
        .iter()
        .map(|(key, value)| (key.to_string(), value.value().clone()))
        .collect();
    JsonValue::Object(map)
}

/// Truthiness as the built-in `if` helper sees it: empty collections,
/// empty strings, zero, `false` and `null` are falsy.
pub(crate) fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(map) => !map.is_empty(),
    }
}

/// String form of a value, following the conventions of template output:
/// `null` is empty, arrays are comma separated, objects are opaque.
pub(crate) fn to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items.iter().map(to_text).collect::<Vec<_>>().join(","),
        JsonValue::Object(_) => "[object Object]".to_string(),
    }
}

/// Integer value of a JSON number, truncating fractions.
pub(crate) fn as_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
}

/// Like [`as_integer`], but also accepts numeric strings.
pub(crate) fn parse_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
        other => as_integer(other),
    }
}

/// Resolve a dot-separated path such as `data.items.0.title`.
pub(crate) fn lookup<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        JsonValue::Object(map) => map.get(segment),
        JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Total ordering used by the sorting helpers. Missing and `null` values
/// sort after everything else.
pub(crate) fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => to_text(x).cmp(&to_text(y)),
    }
}

/// Index range selected by a `slice(start, end)` call on a sequence of
/// `len` items. Negative bounds count from the end.
pub(crate) fn slice_bounds(len: usize, start: i64, end: Option<i64>) -> Range<usize> {
    let resolve = |bound: i64| -> usize {
        if bound < 0 {
            len.saturating_sub(bound.unsigned_abs() as usize)
        } else {
            (bound as usize).min(len)
        }
    };
    let from = resolve(start);
    let to = end.map(resolve).unwrap_or(len);
    if from >= to {
        from..from
    } else {
        from..to
    }
}

/// Characters of `s` selected by [`slice_bounds`].
pub(crate) fn slice_str(s: &str, start: i64, end: Option<i64>) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars[slice_bounds(chars.len(), start, end)].iter().collect()
}

/// Keep the first occurrence of every value, preserving order.
pub(crate) fn dedup<I>(values: I) -> Vec<JsonValue>
where
    I: IntoIterator<Item = JsonValue>,
{
    let mut seen: Vec<JsonValue> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&json!(null)), "");
        assert_eq!(to_text(&json!(3)), "3");
        assert_eq!(to_text(&json!(3.0)), "3");
        assert_eq!(to_text(&json!(2.5)), "2.5");
        assert_eq!(to_text(&json!(["a", 1, null])), "a,1,");
        assert_eq!(to_text(&json!({"a": 1})), "[object Object]");
    }

    #[test]
    fn test_lookup() {
        let value = json!({"a": {"b": [{"c": "d"}]}});
        assert_eq!(lookup(&value, "a.b.0.c"), Some(&json!("d")));
        assert_eq!(lookup(&value, "a.x"), None);
        assert_eq!(lookup(&value, ""), Some(&value));
    }

    #[test]
    fn test_slice_bounds() {
        assert_eq!(slice_bounds(5, 1, None), 1..5);
        assert_eq!(slice_bounds(5, -2, None), 3..5);
        assert_eq!(slice_bounds(5, 0, Some(2)), 0..2);
        assert_eq!(slice_bounds(5, 4, Some(2)), 4..4);
        assert_eq!(slice_bounds(5, 9, None), 5..5);
        assert_eq!(slice_bounds(3, -10, None), 0..3);
        assert_eq!(slice_str("abcd", 2, None), "cd");
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_values(None, Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_values(Some(&json!(null)), None), Ordering::Equal);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let values = vec![json!("a"), json!("a"), json!("c"), json!("b"), json!("c")];
        assert_eq!(dedup(values), vec![json!("a"), json!("c"), json!("b")]);
    }
}
