//! Key-path resolution over a [`Map`] tree.
//!
//! Keys are already normalized (trimmed, non-empty) when they get here. A
//! literal top-level key always wins over traversal, so `"a.b"` stored as a
//! single key shadows `{"a": {"b": ..}}`.

use super::value::{Map, Value};
use super::{ConfigError, Result};

/// Finds the node addressed by `key`.
pub(crate) fn get_path<'a>(
    data: &'a Map,
    key: &str,
    delimiter: char,
    find_by_path: bool,
) -> Option<&'a Value> {
    if let Some(value) = data.get(key) {
        return Some(value);
    }
    if !find_by_path || !key.contains(delimiter) {
        return None;
    }

    let mut segments = key.split(delimiter);
    let mut node = data.get(segments.next()?)?;
    for segment in segments {
        node = child(node, segment)?;
    }
    Some(node)
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Map(map) => map.get(segment),
        Value::List(items) => items.get(segment.parse::<usize>().ok()?),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

/// Writes `value` at `key`, creating intermediate maps as needed.
///
/// Siblings of every node on the path are kept. A list may only be indexed
/// by the final segment, and the index must be in bounds.
pub(crate) fn set_path(
    data: &mut Map,
    key: &str,
    value: Value,
    delimiter: char,
    set_by_path: bool,
) -> Result<()> {
    if !set_by_path || !key.contains(delimiter) {
        data.insert(key.to_string(), value);
        return Ok(());
    }

    let segments: Vec<&str> = key.split(delimiter).collect();
    let (top, rest) = match segments.split_first() {
        Some(split) => split,
        None => return Err(ConfigError::KeyIsEmpty),
    };

    match data.get_mut(*top) {
        None => {
            data.insert(top.to_string(), build_value_by_path(rest, value));
            Ok(())
        }
        Some(Value::Map(map)) => set_in_map(map, rest, value, key),
        Some(Value::List(items)) => set_in_list(items, rest, value, key),
        Some(_) => {
            tracing::warn!(
                key,
                top = *top,
                "top key holds a scalar; storing the full path as a literal top-level key"
            );
            data.insert(key.to_string(), value);
            Ok(())
        }
    }
}

fn set_in_map(map: &mut Map, path: &[&str], value: Value, key: &str) -> Result<()> {
    let Some((first, rest)) = path.split_first() else {
        return Err(ConfigError::path_conflict(key, "empty path segment"));
    };

    if rest.is_empty() {
        map.insert(first.to_string(), value);
        return Ok(());
    }

    match map.get_mut(*first) {
        None => {
            map.insert(first.to_string(), build_value_by_path(rest, value));
            Ok(())
        }
        Some(Value::Map(inner)) => set_in_map(inner, rest, value, key),
        Some(Value::List(items)) => set_in_list(items, rest, value, key),
        Some(other) => Err(ConfigError::path_conflict(
            key,
            format!("'{first}' holds a {} and cannot contain '{}'", other.kind(), rest.join(".")),
        )),
    }
}

fn set_in_list(items: &mut [Value], path: &[&str], value: Value, key: &str) -> Result<()> {
    let [segment] = path else {
        return Err(ConfigError::path_conflict(
            key,
            "max allow 1 level for setting array value",
        ));
    };

    let index = segment
        .parse::<usize>()
        .map_err(|_| ConfigError::path_conflict(key, format!("'{segment}' is not a list index")))?;
    let len = items.len();
    let slot = items.get_mut(index).ok_or_else(|| {
        ConfigError::path_conflict(key, format!("index {index} out of range for list of {len}"))
    })?;
    *slot = value;
    Ok(())
}

/// Builds `{p0: {p1: {... : value}}}` from the given segments.
pub(crate) fn build_value_by_path<S: AsRef<str>>(path: &[S], value: Value) -> Value {
    path.iter().rev().fold(value, |inner, segment| {
        let mut map = Map::new();
        map.insert(segment.as_ref().to_string(), inner);
        Value::Map(map)
    })
}
