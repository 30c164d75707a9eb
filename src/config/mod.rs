//! Configuration tree, loading and typed access.

mod cache;
mod convert;
pub mod driver;
mod error;
mod export;
mod global;
mod interpolate;
mod load;
mod merge;
mod options;
mod path;
mod store;
mod typed;
mod value;

pub use driver::{normalize_format, Decoder, Driver, Encoder};
pub use error::{BoxError, ConfigError, Result};
pub use global::global;
pub use interpolate::interpolate_env;
pub use options::Options;
pub use store::Config;
pub use value::{Map, Number, Value};
