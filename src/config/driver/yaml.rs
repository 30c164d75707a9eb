use crate::config::error::BoxError;
use crate::config::value::{Map, Value};

pub(super) fn decode(blob: &[u8]) -> Result<Map, BoxError> {
    let value: Value = serde_yaml::from_slice(blob)?;
    super::into_root(value)
}

pub(super) fn encode(data: &Map) -> Result<Vec<u8>, BoxError> {
    Ok(serde_yaml::to_string(data)?.into_bytes())
}
