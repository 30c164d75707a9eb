use crate::config::error::BoxError;
use crate::config::value::{Map, Value};

pub(super) fn decode(blob: &[u8]) -> Result<Map, BoxError> {
    let text = std::str::from_utf8(blob)?;
    let table: toml::Table = toml::from_str(text)?;
    super::into_root(Value::from(toml::Value::Table(table)))
}

pub(super) fn encode(data: &Map) -> Result<Vec<u8>, BoxError> {
    Ok(toml::to_string(data)?.into_bytes())
}
