//! Format drivers: named decode/encode function pairs.

mod ini;
mod json;
mod toml;
mod yaml;

use std::collections::HashMap;

use super::error::BoxError;
use super::value::{Map, Value};

/// Turns raw bytes into a tree.
pub type Decoder = fn(&[u8]) -> Result<Map, BoxError>;

/// Turns a tree into raw bytes.
pub type Encoder = fn(&Map) -> Result<Vec<u8>, BoxError>;

pub const JSON_FORMAT: &str = "json";
pub const YAML_FORMAT: &str = "yaml";
pub const TOML_FORMAT: &str = "toml";
pub const INI_FORMAT: &str = "ini";
pub const HCL_FORMAT: &str = "hcl";

/// A named decoder/encoder pair.
#[derive(Debug, Clone, Copy)]
pub struct Driver {
    name: &'static str,
    decoder: Decoder,
    encoder: Encoder,
}

impl Driver {
    pub const fn new(name: &'static str, decoder: Decoder, encoder: Encoder) -> Self {
        Self {
            name,
            decoder,
            encoder,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decoder(&self) -> Decoder {
        self.decoder
    }

    pub fn encoder(&self) -> Encoder {
        self.encoder
    }
}

pub const JSON: Driver = Driver::new(JSON_FORMAT, json::decode, json::encode);
pub const YAML: Driver = Driver::new(YAML_FORMAT, yaml::decode, yaml::encode);
pub const TOML: Driver = Driver::new(TOML_FORMAT, toml::decode, toml::encode);
pub const INI: Driver = Driver::new(INI_FORMAT, ini::decode, ini::encode);

/// Canonical format name: trimmed, lower-cased, aliases resolved.
///
/// `yml` is `yaml`, `inc` is `ini` and `conf` is `hcl`.
pub fn normalize_format(format: &str) -> String {
    let format = format.trim().trim_start_matches('.').to_ascii_lowercase();
    match format.as_str() {
        "yml" => YAML_FORMAT.to_string(),
        "inc" => INI_FORMAT.to_string(),
        "conf" => HCL_FORMAT.to_string(),
        _ => format,
    }
}

/// Requires a decoded document to be a map. An empty document is an empty map.
pub(crate) fn into_root(value: Value) -> Result<Map, BoxError> {
    match value {
        Value::Map(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(format!("expected a map at the top level, found {}", other.kind()).into()),
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DriverRegistry {
    decoders: HashMap<String, Decoder>,
    encoders: HashMap<String, Encoder>,
}

impl DriverRegistry {
    pub(crate) fn with_json() -> Self {
        let mut registry = Self::default();
        registry.add(JSON);
        registry
    }

    pub(crate) fn add(&mut self, driver: Driver) {
        let format = normalize_format(driver.name());
        self.decoders.insert(format.clone(), driver.decoder());
        self.encoders.insert(format, driver.encoder());
    }

    pub(crate) fn set_decoder(&mut self, format: &str, decoder: Decoder) {
        self.decoders.insert(normalize_format(format), decoder);
    }

    pub(crate) fn set_encoder(&mut self, format: &str, encoder: Encoder) {
        self.encoders.insert(normalize_format(format), encoder);
    }

    pub(crate) fn decoder(&self, format: &str) -> Option<Decoder> {
        self.decoders.get(&normalize_format(format)).copied()
    }

    pub(crate) fn encoder(&self, format: &str) -> Option<Encoder> {
        self.encoders.get(&normalize_format(format)).copied()
    }

    pub(crate) fn remove(&mut self, format: &str) {
        let format = normalize_format(format);
        self.decoders.remove(&format);
        self.encoders.remove(&format);
    }
}
