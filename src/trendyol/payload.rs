//! Path lookups over the untyped product payload.
//!
//! The embedded state has no stable schema: any level may be missing, null
//! or of an unexpected type. Everything the normalizer reads goes through
//! these helpers so absence is handled in one place.

use serde_json::Value;

/// Placeholder emitted for any field that has no usable value.
pub const MISSING: &str = "-";

/// Follows `path` through nested objects. `None` as soon as a key is absent
/// or an intermediate value is not an object.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Truthiness as used by the page's own data conventions: null, false, zero,
/// empty strings and empty containers count as "no value".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Looks up `path` and keeps the value only when it is truthy.
pub fn lookup_truthy<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    lookup(value, path).filter(|v| is_truthy(v))
}

/// Returns the string at `path`, or [`MISSING`] when absent, blank or not a
/// scalar.
pub fn text_or_missing(value: &Value, path: &[&str]) -> String {
    lookup_truthy(value, path).and_then(scalar_to_string).unwrap_or_else(|| MISSING.to_string())
}

/// Renders a string or number as text. Containers and booleans have no
/// sensible text form and yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Returns the array at `path`, or an empty slice.
pub fn array_at<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    lookup(value, path).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}
