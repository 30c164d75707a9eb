//! The process-wide default instance.

use std::sync::OnceLock;

use super::Config;

static DEFAULT: OnceLock<Config> = OnceLock::new();

/// Returns the shared instance named `default`, created on first use with
/// only the JSON driver.
pub fn global() -> &'static Config {
    DEFAULT.get_or_init(|| Config::new("default"))
}
