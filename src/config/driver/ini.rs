//! Minimal INI support.
//!
//! ```ini
//! ; root keys come before any section
//! name = app
//!
//! [db]
//! host = "localhost"
//! hosts[] = a
//! hosts[] = b
//! ```
//!
//! Values are kept as strings; the typed accessors coerce them on read.

use std::fmt::Write as _;

use crate::config::error::BoxError;
use crate::config::value::{Map, Value};

pub(super) fn decode(blob: &[u8]) -> Result<Map, BoxError> {
    let text = std::str::from_utf8(blob)?;
    let mut root = Map::new();
    let mut section: Option<String> = None;

    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("line {}: empty section name", number + 1).into());
            }
            root.entry(name.to_string())
                .or_insert_with(|| Value::Map(Map::new()));
            section = Some(name.to_string());
            continue;
        }

        let Some((key, value)) = split_pair(line) else {
            return Err(format!("line {}: expected 'key = value'", number + 1).into());
        };

        let target = match &section {
            None => &mut root,
            Some(name) => match root.get_mut(name) {
                Some(Value::Map(map)) => map,
                _ => {
                    return Err(
                        format!("line {}: section '{name}' is not a map", number + 1).into(),
                    )
                }
            },
        };
        insert_entry(target, key, value);
    }

    Ok(root)
}

fn split_pair(line: &str) -> Option<(&str, String)> {
    let at = line.find(['=', ':'])?;
    let key = line[..at].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, unquote(line[at + 1..].trim()).to_string()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn insert_entry(target: &mut Map, key: &str, value: String) {
    let Some(list_key) = key.strip_suffix("[]") else {
        target.insert(key.to_string(), Value::String(value));
        return;
    };

    match target.get_mut(list_key) {
        Some(Value::List(items)) => items.push(Value::String(value)),
        _ => {
            target.insert(list_key.to_string(), Value::List(vec![Value::String(value)]));
        }
    }
}

pub(super) fn encode(data: &Map) -> Result<Vec<u8>, BoxError> {
    let mut out = String::new();
    let mut sections = Vec::new();

    for (key, value) in data {
        match value {
            Value::Map(section) => sections.push((key, section)),
            other => write_entry(&mut out, key, other)?,
        }
    }

    for (name, section) in sections {
        if !out.is_empty() {
            out.push('\n');
        }
        writeln!(out, "[{name}]")?;
        for (key, value) in section {
            write_entry(&mut out, key, value)?;
        }
    }

    Ok(out.into_bytes())
}

fn write_entry(out: &mut String, key: &str, value: &Value) -> Result<(), BoxError> {
    match value {
        Value::List(items) => {
            for item in items {
                writeln!(out, "{key}[] = {}", scalar(key, item)?)?;
            }
        }
        other => writeln!(out, "{key} = {}", scalar(key, other)?)?,
    }
    Ok(())
}

fn scalar(key: &str, value: &Value) -> Result<String, BoxError> {
    match value {
        Value::Null => Ok(String::new()),
        other => other.to_scalar_string().ok_or_else(|| {
            format!("ini cannot represent nested {} under '{key}'", other.kind()).into()
        }),
    }
}
