//! Loading sources into a [`Config`].
//!
//! Every source is decoded into a [`Map`] first and then merged: the first
//! load installs the tree, later loads deep-merge into it.

use std::path::Path;

use serde::Serialize;

use super::driver::normalize_format;
use super::merge::{deep_merge, merge_source};
use super::path::build_value_by_path;
use super::value::{Map, Number, Value};
use super::{Config, ConfigError, Result};

impl Config {
    /// Decodes and merges each source in order.
    ///
    /// An empty `format` falls back to [`Options::read_format`](super::Options::read_format).
    pub fn load_sources<B: AsRef<[u8]>>(&self, format: &str, sources: &[B]) -> Result<()> {
        for source in sources {
            self.merge_blob(format, source.as_ref(), None)?;
        }
        Ok(())
    }

    pub fn load_strings(&self, format: &str, sources: &[&str]) -> Result<()> {
        for source in sources {
            self.merge_blob(format, source.as_bytes(), None)?;
        }
        Ok(())
    }

    /// Loads files in order. The format comes from each file's extension.
    ///
    /// A missing file is an error.
    pub fn load_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        for path in paths {
            self.load_file(path.as_ref(), true)?;
        }
        Ok(())
    }

    /// Like [`load_files`](Self::load_files), but missing files are skipped.
    pub fn load_exists<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        for path in paths {
            self.load_file(path.as_ref(), false)?;
        }
        Ok(())
    }

    /// Loads every previously loaded file again into a fresh tree.
    ///
    /// All files are decoded before the tree is touched. If any of them
    /// fails, the current data and file list are kept.
    pub fn reload_files(&self) -> Result<()> {
        let files = self.loaded_files();
        tracing::debug!(count = files.len(), "reloading config files");

        let mut fresh = Map::new();
        for file in &files {
            let path = Path::new(file);
            let Some(blob) = read_file(path, true)? else {
                continue;
            };
            let source = self.decode_file(path, &blob)?;
            merge_source(&mut fresh, source);
        }

        self.update(|state| {
            *state.data_mut() = fresh;
            state.loaded_files = files;
            Ok(())
        })
    }

    /// Merges an in-memory value. It must serialize to a map.
    pub fn load_data<T: Serialize + ?Sized>(&self, data: &T) -> Result<()> {
        let json = serde_json::to_value(data)?;
        let Value::Map(source) = serde_json::from_value::<Value>(json)? else {
            return Err(ConfigError::RootNotMap);
        };
        self.update(|state| {
            merge_source(state.data_mut(), source);
            Ok(())
        })
    }

    /// Sets each key from the environment variable named by the upper-cased
    /// key. Unset variables are skipped.
    pub fn load_os_env(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            if let Ok(value) = std::env::var(key.to_uppercase()) {
                self.set(key, value)?;
            }
        }
        Ok(())
    }

    /// Loads every environment variable starting with `prefix` + `separator`.
    ///
    /// The rest of the name is split on `separator` and lower-cased into a
    /// key path, so with prefix `APP` and separator `__`,
    /// `APP__DATABASE__HOST` becomes `database.host`. Values are coerced to
    /// the most specific scalar: bool, integer, float, then string.
    ///
    /// # Panics
    ///
    /// Panics if `separator` is empty.
    pub fn load_env_prefix(&self, prefix: &str, separator: &str) -> Result<()> {
        assert!(!separator.is_empty(), "separator must not be empty");
        let source = env_source(std::env::vars(), prefix, separator);
        tracing::debug!(prefix, keys = source.len(), "merging environment variables");
        self.update(|state| {
            merge_source(state.data_mut(), source);
            Ok(())
        })
    }

    fn load_file(&self, path: &Path, required: bool) -> Result<()> {
        let Some(blob) = read_file(path, required)? else {
            return Ok(());
        };
        let source = self.decode_file(path, &blob)?;
        self.merge(source, Some(path))
    }

    fn merge_blob(&self, format: &str, blob: &[u8], origin: Option<&Path>) -> Result<()> {
        let source = self.decode(format, blob)?;
        self.merge(source, origin)
    }

    fn merge(&self, source: Map, origin: Option<&Path>) -> Result<()> {
        self.update(|state| {
            tracing::debug!(keys = source.len(), "merging config source");
            merge_source(state.data_mut(), source);
            if let Some(path) = origin {
                state.loaded_files.push(path.display().to_string());
            }
            Ok(())
        })
    }

    /// Decodes a file blob, taking the format from the extension.
    fn decode_file(&self, path: &Path, blob: &[u8]) -> Result<Map> {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        self.decode(format, blob).map_err(|err| match err {
            ConfigError::Decode { format, source } => ConfigError::ParseError {
                path: path.to_path_buf(),
                format,
                source,
            },
            other => other,
        })
    }

    /// Decodes without touching the tree. An empty `format` falls back to
    /// the read format.
    fn decode(&self, format: &str, blob: &[u8]) -> Result<Map> {
        let (format, decode) = {
            let state = self.read_state();
            let format = match normalize_format(format) {
                f if f.is_empty() => normalize_format(&state.view.options.read_format),
                f => f,
            };
            let decode = state
                .drivers
                .decoder(&format)
                .ok_or_else(|| ConfigError::UnknownFormat(format.clone()))?;
            (format, decode)
        };
        tracing::debug!(format = %format, bytes = blob.len(), "decoding config source");
        decode(blob).map_err(|source| ConfigError::Decode { format, source })
    }
}

/// Reads a file. A missing file is `None` unless it is required.
fn read_file(path: &Path, required: bool) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(blob) => Ok(Some(blob)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Collects prefixed variables into a nested map.
fn env_source(
    vars: impl IntoIterator<Item = (String, String)>,
    prefix: &str,
    separator: &str,
) -> Map {
    let prefix_with_sep = format!("{prefix}{separator}");
    let mut source = Map::new();

    for (key, value) in vars {
        let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
            continue;
        };
        if path_str.is_empty() {
            continue;
        }

        let path: Vec<String> = path_str
            .split(separator)
            .map(|s| s.to_lowercase())
            .collect();
        if let Value::Map(entry) = build_value_by_path(&path, coerce_value(&value)) {
            deep_merge(&mut source, entry);
        }
    }

    source
}

fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Number(Number::Int(i));
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Number(Number::Float(f));
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
