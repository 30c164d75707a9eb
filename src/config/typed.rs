//! Typed reads over the dynamic tree.
//!
//! Every accessor resolves the key with [`Config::get`] rules and then
//! converts. A missing key or a failed conversion both give `None`; the
//! latter also lands in [`Config::last_error`].

use std::collections::BTreeMap;

use super::convert;
use super::{Config, ConfigError};

impl Config {
    /// Reads a scalar as a string. Strings are env-interpolated when
    /// [`Options::parse_env`](super::Options::parse_env) is on.
    pub fn string(&self, key: &str) -> Option<String> {
        self.read(|view| {
            let cached = view.options.enable_cache;
            if cached {
                if let Some(hit) = self.cache().string(view.generation, key) {
                    tracing::trace!(key, "string cache hit");
                    return Some(hit);
                }
            }

            let value = self.lookup(view, key, view.options.parse_key)?;
            let Some(out) = convert::to_string(value, view.options.parse_env) else {
                return self.conversion_failed(key, "string");
            };
            if cached {
                self.cache().put_string(view.generation, key, &out);
            }
            Some(out)
        })
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn int(&self, key: &str) -> Option<i32> {
        self.parse_with(key, "int", convert::parse_int)
    }

    pub fn int_or(&self, key: &str, default: i32) -> i32 {
        self.int(key).unwrap_or(default)
    }

    pub fn int64(&self, key: &str) -> Option<i64> {
        self.parse_with(key, "int64", convert::parse_int)
    }

    pub fn int64_or(&self, key: &str, default: i64) -> i64 {
        self.int64(key).unwrap_or(default)
    }

    pub fn uint(&self, key: &str) -> Option<u64> {
        self.parse_with(key, "uint", convert::parse_int)
    }

    pub fn uint_or(&self, key: &str, default: u64) -> u64 {
        self.uint(key).unwrap_or(default)
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.parse_with(key, "float", convert::parse_float)
    }

    pub fn float_or(&self, key: &str, default: f64) -> f64 {
        self.float(key).unwrap_or(default)
    }

    /// Reads a boolean: `1 true yes` and `"" 0 false no`, ignoring case.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.parse_with(key, "bool", convert::parse_bool)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.bool(key).unwrap_or(default)
    }

    /// Reads a list, formatting every element as a string.
    pub fn strings(&self, key: &str) -> Option<Vec<String>> {
        self.read(|view| {
            let cached = view.options.enable_cache;
            if cached {
                if let Some(hit) = self.cache().strings(view.generation, key) {
                    tracing::trace!(key, "strings cache hit");
                    return Some(hit);
                }
            }

            let value = self.lookup(view, key, view.options.parse_key)?;
            let Some(out) = convert::to_strings(value) else {
                return self.conversion_failed(key, "[]string");
            };
            if cached {
                self.cache().put_strings(view.generation, key, &out);
            }
            Some(out)
        })
    }

    pub fn ints(&self, key: &str) -> Option<Vec<i64>> {
        let value = self.get(key)?;
        convert::to_ints(&value).or_else(|| self.conversion_failed(key, "[]int"))
    }

    /// Reads a map, formatting every value as a string.
    pub fn string_map(&self, key: &str) -> Option<BTreeMap<String, String>> {
        self.read(|view| {
            let cached = view.options.enable_cache;
            if cached {
                if let Some(hit) = self.cache().string_map(view.generation, key) {
                    tracing::trace!(key, "string map cache hit");
                    return Some(hit);
                }
            }

            let value = self.lookup(view, key, view.options.parse_key)?;
            let Some(out) = convert::to_string_map(value) else {
                return self.conversion_failed(key, "map[string]string");
            };
            if cached {
                self.cache().put_string_map(view.generation, key, &out);
            }
            Some(out)
        })
    }

    pub fn int_map(&self, key: &str) -> Option<BTreeMap<String, i64>> {
        let value = self.get(key)?;
        convert::to_int_map(&value).or_else(|| self.conversion_failed(key, "map[string]int"))
    }

    fn parse_with<T>(
        &self,
        key: &str,
        target: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        let raw = self.string(key)?;
        parse(&raw).or_else(|| self.conversion_failed(key, target))
    }

    fn conversion_failed<T>(&self, key: &str, target: &'static str) -> Option<T> {
        self.record_error(ConfigError::Convert {
            key: key.to_string(),
            target,
        });
        None
    }
}
