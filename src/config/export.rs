//! Writing the tree out and binding it to typed structures.

use std::io::Write;

use serde::de::DeserializeOwned;

use super::driver::normalize_format;
use super::value::Value;
use super::{Config, ConfigError, Result};

impl Config {
    /// Encodes the whole tree with the `format` encoder and writes it to
    /// `out`, followed by a newline.
    ///
    /// An empty tree writes nothing. Returns the number of bytes written.
    pub fn dump_to<W: Write>(&self, out: &mut W, format: &str) -> Result<usize> {
        let format = normalize_format(format);
        let encoded = {
            let state = self.read_state();
            if state.view.data.is_empty() {
                return Ok(0);
            }
            let encode = state
                .drivers
                .encoder(&format)
                .ok_or_else(|| ConfigError::MissingEncoder(format.clone()))?;
            encode(&state.view.data).map_err(|source| ConfigError::Encode {
                format: format.clone(),
                source,
            })?
        };

        out.write_all(&encoded)?;
        out.write_all(b"\n")?;
        tracing::debug!(format = %format, bytes = encoded.len() + 1, "config dumped");
        Ok(encoded.len() + 1)
    }

    /// [`dump_to`](Self::dump_to) using [`Options::dump_format`](super::Options::dump_format).
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<usize> {
        let format = self.read(|view| view.options.dump_format.clone());
        self.dump_to(out, &format)
    }

    /// The tree as compact JSON, or an empty string if it cannot be encoded.
    pub fn to_json(&self) -> String {
        self.read(|view| match serde_json::to_string(view.data.as_ref()) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode config as json");
                String::new()
            }
        })
    }

    /// Deserializes the subtree at `key` into `T`. An empty key binds the
    /// whole tree.
    ///
    /// ```
    /// use cfgtree::Config;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Db {
    ///     host: String,
    ///     port: u16,
    /// }
    ///
    /// let config = Config::new("app");
    /// config.load_strings("json", &[r#"{"db": {"host": "localhost", "port": 5432}}"#])?;
    /// let db: Db = config.structure("db")?;
    /// assert_eq!(db.port, 5432);
    /// # Ok::<(), cfgtree::ConfigError>(())
    /// ```
    pub fn structure<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let json = self.read(|view| {
            let subtree = if view.options.format_key(key).is_empty() {
                serde_json::to_value(view.data.as_ref())
            } else {
                let value: &Value = self
                    .lookup(view, key, view.options.parse_key)
                    .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;
                serde_json::to_value(value)
            };
            subtree.map_err(ConfigError::from)
        })?;
        Ok(serde_json::from_value(json)?)
    }
}
