//! A hierarchical configuration store.
//!
//! Sources in JSON, YAML, TOML or INI are decoded into one [`Value`] tree
//! and deep-merged in load order. Values are read back through
//! delimiter-separated key paths, either raw with [`Config::get`] or
//! coerced with the typed accessors such as [`Config::int`].
//!
//! ```
//! use cfgtree::{driver, Config};
//!
//! let config = Config::new("app");
//! config.add_driver(driver::YAML);
//! config.load_strings("json", &[r#"{"db": {"host": "localhost", "port": 5432}}"#])?;
//! config.load_strings("yaml", &["db:\n  port: 6432\n"])?;
//!
//! assert_eq!(config.string("db.host").as_deref(), Some("localhost"));
//! assert_eq!(config.int("db.port"), Some(6432));
//! # Ok::<(), cfgtree::ConfigError>(())
//! ```

pub mod config;

pub use config::{
    driver, global, interpolate_env, normalize_format, BoxError, Config, ConfigError, Decoder,
    Driver, Encoder, Map, Number, Options, Result, Value,
};
