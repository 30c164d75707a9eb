//! Conversion rules behind the typed accessors.

use std::collections::BTreeMap;
use std::str::FromStr;

use super::interpolate::interpolate_env;
use super::value::Value;

/// String form of a resolved value. Only strings go through env interpolation.
pub(crate) fn to_string(value: &Value, parse_env: bool) -> Option<String> {
    match value {
        Value::String(s) if parse_env => Some(interpolate_env(s).into_owned()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => value.to_scalar_string(),
        Value::Null | Value::List(_) | Value::Map(_) => None,
    }
}

/// Parses an integer literal. Float text such as `"1.5"` is rejected.
pub(crate) fn parse_int<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}

pub(crate) fn parse_float(raw: &str) -> Option<f64> {
    raw.parse().ok()
}

/// Case-insensitive boolean table: `"" 0 false no` and `1 true yes`.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Some(false),
        "1" | "true" | "yes" => Some(true),
        _ => None,
    }
}

pub(crate) fn to_strings(value: &Value) -> Option<Vec<String>> {
    value.as_list()?.iter().map(Value::to_scalar_string).collect()
}

pub(crate) fn to_ints(value: &Value) -> Option<Vec<i64>> {
    value
        .as_list()?
        .iter()
        .map(|item| parse_int(&item.to_scalar_string()?))
        .collect()
}

pub(crate) fn to_string_map(value: &Value) -> Option<BTreeMap<String, String>> {
    value
        .as_map()?
        .iter()
        .map(|(k, v)| Some((k.clone(), v.to_scalar_string()?)))
        .collect()
}

pub(crate) fn to_int_map(value: &Value) -> Option<BTreeMap<String, i64>> {
    value
        .as_map()?
        .iter()
        .map(|(k, v)| Some((k.clone(), parse_int(&v.to_scalar_string()?)?)))
        .collect()
}
