use super::driver::JSON_FORMAT;

/// Per-instance settings. Fixed once data has been loaded, except for
/// [`Config::readonly`](super::Config::readonly).
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Expand `${NAME}` and `${NAME|default}` in string values on read.
    pub parse_env: bool,
    /// Reject `set` and `set_data`.
    pub readonly: bool,
    /// Memoize `string`, `strings` and `string_map` results per key.
    pub enable_cache: bool,
    /// Resolve `a.b.c` through nested containers in `get` and `set`.
    pub parse_key: bool,
    /// Separator between key path segments.
    pub delimiter: char,
    /// Format used by [`Config::write_to`](super::Config::write_to).
    pub dump_format: String,
    /// Format assumed for sources loaded without an explicit one.
    pub read_format: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            parse_env: false,
            readonly: false,
            enable_cache: false,
            parse_key: true,
            delimiter: '.',
            dump_format: JSON_FORMAT.to_string(),
            read_format: JSON_FORMAT.to_string(),
        }
    }
}

impl Options {
    /// Normalizes a raw key: surrounding whitespace and delimiters are dropped.
    pub(crate) fn format_key<'a>(&self, key: &'a str) -> &'a str {
        key.trim().trim_matches(self.delimiter)
    }
}
