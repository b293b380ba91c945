//! Tolerant accessors over arbitrary JSON payloads.
//!
//! Every lookup in the normalizer goes through these helpers so that alias
//! handling stays in one place: a field is described by an ordered list of
//! key paths and the first present one wins.

use serde_json::Value;
use somanorm_stats::parse_float;

/// Path of object keys from a container down to a field.
///
/// The empty path designates the container itself.
pub type KeyPath = &'static [&'static str];

/// Coerce a JSON number or numeric string to a finite `f64`.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) if !s.trim().is_empty() => parse_float(s),
        _ => None,
    }
}

/// Follow a key path. Null counts as absent.
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    (!current.is_null()).then_some(current)
}

/// First non-null value among `paths`, tried in order.
pub fn first_present<'a>(value: &'a Value, paths: &[KeyPath]) -> Option<&'a Value> {
    paths.iter().find_map(|path| get_path(value, path))
}

/// First value among `paths` that coerces to a number.
pub fn first_number(value: &Value, paths: &[KeyPath]) -> Option<f64> {
    paths
        .iter()
        .find_map(|path| get_path(value, path).and_then(to_number))
}

/// First present value among plain keys.
pub fn first_key<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let object = value.as_object()?;
    keys.iter()
        .find_map(|key| object.get(*key).filter(|v| !v.is_null()))
}

/// Trimmed non-empty string, if `value` is one.
pub fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Identifier-like field: strings are trimmed, numbers are rendered.
pub fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
