use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arc_swap::ArcSwapOption;

use super::cache::Cache;
use super::driver::{Decoder, Driver, DriverRegistry, Encoder};
use super::path::{get_path, set_path};
use super::value::{Map, Value};
use super::{ConfigError, Options, Result};

/// Everything a read needs: options, data, and the generation the data
/// belongs to. Read-only instances publish one of these for lock-free reads.
#[derive(Debug, Clone, Default)]
pub(crate) struct View {
    pub(crate) options: Options,
    pub(crate) data: Arc<Map>,
    pub(crate) generation: u64,
}

#[derive(Debug)]
pub(crate) struct State {
    pub(crate) view: View,
    pub(crate) drivers: DriverRegistry,
    pub(crate) loaded_files: Vec<String>,
}

impl State {
    pub(crate) fn data_mut(&mut self) -> &mut Map {
        Arc::make_mut(&mut self.view.data)
    }
}

/// A hierarchical configuration tree.
///
/// Values are addressed by delimiter-separated key paths such as
/// `"db.hosts.0"`. Sources are decoded by format drivers and deep-merged
/// into the tree: maps combine, everything else is replaced by the newer
/// source.
///
/// ```
/// use cfgtree::Config;
///
/// let config = Config::new("app");
/// config.load_strings("json", &[r#"{"name": "app", "map1": {"key": "val"}}"#])?;
/// config.set("map1.key2", "added")?;
///
/// assert_eq!(config.string("map1.key").as_deref(), Some("val"));
/// assert_eq!(config.string("map1.key2").as_deref(), Some("added"));
/// # Ok::<(), cfgtree::ConfigError>(())
/// ```
///
/// ## Concurrency
///
/// One read/write lock guards the tree. Once an instance is read-only it
/// publishes an immutable snapshot and reads no longer touch the lock.
pub struct Config {
    name: String,
    state: RwLock<State>,
    frozen: ArcSwapOption<View>,
    cache: Mutex<Cache>,
    last_error: Mutex<Option<Arc<ConfigError>>>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("name", &self.name)
            .field("options", &self.options())
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Creates an empty tree with the JSON driver registered.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name.into(), DriverRegistry::with_json())
    }

    /// Creates an empty tree with no drivers at all.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::with_registry(name.into(), DriverRegistry::default())
    }

    fn with_registry(name: String, drivers: DriverRegistry) -> Self {
        Self {
            name,
            state: RwLock::new(State {
                view: View::default(),
                drivers,
                loaded_files: Vec::new(),
            }),
            frozen: ArcSwapOption::empty(),
            cache: Mutex::new(Cache::default()),
            last_error: Mutex::new(None),
        }
    }

    /// Applies options and returns the instance, builder style.
    ///
    /// # Panics
    ///
    /// Panics if any data has already been loaded.
    pub fn with_options(self, apply: impl FnOnce(&mut Options)) -> Self {
        self.set_options(apply);
        self
    }

    /// Applies options in place.
    ///
    /// # Panics
    ///
    /// Panics if any data has already been loaded.
    pub fn set_options(&self, apply: impl FnOnce(&mut Options)) {
        let mut state = self.write_state();
        assert!(
            state.view.data.is_empty(),
            "config: cannot set options after data has been loaded"
        );
        apply(&mut state.view.options);
        self.publish(&state);
    }

    /// Switches the instance to read-only mode. `set` is rejected from now on.
    pub fn readonly(&self) {
        let mut state = self.write_state();
        state.view.options.readonly = true;
        self.publish(&state);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> Options {
        self.read(|view| view.options.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|view| view.data.is_empty())
    }

    /// A copy of the whole tree.
    pub fn data(&self) -> Map {
        self.read(|view| view.data.as_ref().clone())
    }

    pub fn loaded_files(&self) -> Vec<String> {
        self.read_state().loaded_files.clone()
    }

    /// The last error recorded by a lookup that returned nothing.
    pub fn last_error(&self) -> Option<Arc<ConfigError>> {
        lock(&self.last_error).clone()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Looks up `key`, walking nested maps and lists unless
    /// [`Options::parse_key`] is off.
    ///
    /// A top-level key that literally equals `key` always wins over a path
    /// walk, even when it contains the delimiter.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read(|view| self.lookup(view, key, view.options.parse_key).cloned())
    }

    /// Like [`get`](Self::get), with path traversal chosen by the caller.
    pub fn get_with_path(&self, key: &str, find_by_path: bool) -> Option<Value> {
        self.read(|view| self.lookup(view, key, find_by_path).cloned())
    }

    pub(crate) fn lookup<'a>(
        &self,
        view: &'a View,
        key: &str,
        find_by_path: bool,
    ) -> Option<&'a Value> {
        let key = view.options.format_key(key);
        if key.is_empty() {
            self.record_error(ConfigError::KeyIsEmpty);
            return None;
        }
        get_path(&view.data, key, view.options.delimiter, find_by_path)
    }

    /// Sets `value` at `key`.
    ///
    /// Intermediate maps are created as needed and siblings are kept. Under a
    /// list only the final segment may index, and it must be in bounds.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let set_by_path = self.read(|view| view.options.parse_key);
        self.set_with_path(key, value, set_by_path)
    }

    /// Like [`set`](Self::set). With `set_by_path` off the key is always
    /// written as a literal top-level key.
    pub fn set_with_path(
        &self,
        key: &str,
        value: impl Into<Value>,
        set_by_path: bool,
    ) -> Result<()> {
        let value = value.into();
        self.update(|state| {
            if state.view.options.readonly {
                return Err(ConfigError::ReadOnly);
            }
            let key = state.view.options.format_key(key);
            if key.is_empty() {
                return Err(ConfigError::KeyIsEmpty);
            }
            let delimiter = state.view.options.delimiter;
            set_path(state.data_mut(), key, value, delimiter, set_by_path)?;
            tracing::debug!(key, "config value set");
            Ok(())
        })
    }

    /// Replaces the whole tree.
    pub fn set_data(&self, data: Map) -> Result<()> {
        self.update(|state| {
            if state.view.options.readonly {
                return Err(ConfigError::ReadOnly);
            }
            *state.data_mut() = data;
            Ok(())
        })
    }

    /// Drops all data and the list of loaded files.
    pub fn clear_data(&self) {
        let mut state = self.write_state();
        state.view.data = Arc::new(Map::new());
        state.loaded_files.clear();
        self.commit(&mut state);
    }

    pub fn clear_caches(&self) {
        lock(&self.cache).clear();
    }

    /// Drops data, caches and loaded files, and leaves read-only mode.
    pub fn clear_all(&self) {
        let mut state = self.write_state();
        state.view.data = Arc::new(Map::new());
        state.view.options.readonly = false;
        state.loaded_files.clear();
        self.commit(&mut state);
        *lock(&self.last_error) = None;
    }

    /// Registers a driver, replacing any existing one for the same format.
    pub fn add_driver(&self, driver: Driver) {
        self.write_state().drivers.add(driver);
    }

    pub fn set_decoder(&self, format: &str, decoder: Decoder) {
        self.write_state().drivers.set_decoder(format, decoder);
    }

    pub fn set_encoder(&self, format: &str, encoder: Encoder) {
        self.write_state().drivers.set_encoder(format, encoder);
    }

    pub fn has_decoder(&self, format: &str) -> bool {
        self.read_state().drivers.decoder(format).is_some()
    }

    pub fn has_encoder(&self, format: &str) -> bool {
        self.read_state().drivers.encoder(format).is_some()
    }

    /// Removes both the decoder and the encoder of `format`.
    pub fn remove_driver(&self, format: &str) {
        self.write_state().drivers.remove(format);
    }

    /// Runs `f` against the current view, lock-free when read-only.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&View) -> R) -> R {
        if let Some(view) = self.frozen.load_full() {
            return f(&view);
        }
        let state = self.read_state();
        f(&state.view)
    }

    /// Runs a mutation under the write lock. On success the generation is
    /// bumped, caches are dropped and the read-only snapshot is refreshed.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut State) -> Result<R>) -> Result<R> {
        let mut state = self.write_state();
        let out = f(&mut state)?;
        self.commit(&mut state);
        Ok(out)
    }

    fn commit(&self, state: &mut State) {
        state.view.generation += 1;
        self.publish(state);
        lock(&self.cache).clear();
    }

    fn publish(&self, state: &State) {
        if state.view.options.readonly {
            self.frozen.store(Some(Arc::new(state.view.clone())));
        } else {
            self.frozen.store(None);
        }
    }

    pub(crate) fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn cache(&self) -> MutexGuard<'_, Cache> {
        lock(&self.cache)
    }

    pub(crate) fn record_error(&self, err: ConfigError) {
        *lock(&self.last_error) = Some(Arc::new(err));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn loaded() -> Config {
        let config = Config::new("test");
        config
            .load_strings(
                "json",
                &[r#"{
                    "name": "app",
                    "debug": false,
                    "age": 123,
                    "map1": {"key": "val", "key1": "val1"},
                    "arr1": ["val", "val1", "val2"]
                }"#],
            )
            .unwrap();
        config
    }

    #[test]
    fn test_concrete_scenario() {
        let config = loaded();
        assert_eq!(config.get("name"), Some(Value::from("app")));
        assert_eq!(config.get("map1.key"), Some(Value::from("val")));
        config.set("map1.key2", "added").unwrap();
        assert_eq!(config.get("map1.key2"), Some(Value::from("added")));
        assert_eq!(config.get("map1.key"), Some(Value::from("val")));
    }

    #[test]
    fn test_key_is_trimmed() {
        let config = loaded();
        assert_eq!(config.get(" .map1.key. "), Some(Value::from("val")));
    }

    #[test]
    fn test_empty_key() {
        let config = loaded();
        assert!(config.get("  ").is_none());
        assert!(matches!(
            config.last_error().as_deref(),
            Some(ConfigError::KeyIsEmpty)
        ));
        assert!(matches!(config.set("..", 1), Err(ConfigError::KeyIsEmpty)));
    }

    #[test]
    fn test_out_of_range_is_not_found() {
        let config = loaded();
        assert!(config.get("arr1.100").is_none());
        assert_eq!(config.get("arr1.2"), Some(Value::from("val2")));
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let config = Config::new("rt");
        for (key, value) in [
            ("top", Value::from(1)),
            ("a.b.c", Value::from("deep")),
            ("a.b.d", Value::from(true)),
            ("a.x", Value::from(2.5)),
        ] {
            config.set(key, value.clone()).unwrap();
            assert_eq!(config.get(key), Some(value));
        }
        assert_eq!(config.get("a.b.c"), Some(Value::from("deep")));

        config.set("count", 5usize).unwrap();
        assert_eq!(config.uint("count"), Some(5));
    }

    #[test]
    fn test_readonly_rejects_set() {
        let config = loaded();
        config.readonly();
        assert!(matches!(config.set("name", "other"), Err(ConfigError::ReadOnly)));
        assert!(matches!(config.set_data(Map::new()), Err(ConfigError::ReadOnly)));
        assert_eq!(config.get("name"), Some(Value::from("app")));
    }

    #[test]
    fn test_readonly_still_loads_and_reads_snapshot() {
        let config = Config::new("ro").with_options(|o| o.readonly = true);
        config.load_strings("json", &[r#"{"a": {"x": 1}}"#]).unwrap();
        config.load_strings("json", &[r#"{"a": {"y": 2}}"#]).unwrap();
        assert_eq!(config.get("a.x"), Some(Value::from(1)));
        assert_eq!(config.get("a.y"), Some(Value::from(2)));
    }

    #[test]
    #[should_panic(expected = "cannot set options after data has been loaded")]
    fn test_options_locked_after_load() {
        let config = loaded();
        config.set_options(|o| o.parse_env = true);
    }

    #[test]
    fn test_get_without_path_lookup() {
        let config = loaded();
        assert!(config.get_with_path("map1.key", false).is_none());
        let config = Config::new("flat").with_options(|o| o.parse_key = false);
        config.set("a.b", 1).unwrap();
        assert_eq!(config.data().get("a.b"), Some(&Value::from(1)));
        assert!(config.get_with_path("a.b", true).is_some());
    }

    #[test]
    fn test_custom_delimiter() {
        let config = Config::new("slash").with_options(|o| o.delimiter = '/');
        config.set("db/host", "localhost").unwrap();
        assert_eq!(config.get("db/host"), Some(Value::from("localhost")));
        assert_eq!(config.get("/db/host/"), Some(Value::from("localhost")));
        assert!(config.get("db.host").is_none());
    }

    #[test]
    fn test_set_list_too_deep() {
        let config = loaded();
        let err = config.set("arr1.0.x", "v").unwrap_err();
        assert!(matches!(err, ConfigError::PathConflict { .. }));
        assert_eq!(config.get("arr1.0"), Some(Value::from("val")));
    }

    #[test]
    fn test_clear() {
        let config = loaded();
        config.readonly();
        config.clear_data();
        assert!(config.is_empty());
        config.clear_all();
        assert!(!config.options().readonly);
        config.set("again", 1).unwrap();
        assert!(config.exists("again"));
    }

    #[test]
    fn test_drivers_can_be_managed() {
        let config = Config::empty("bare");
        assert!(!config.has_decoder("json"));
        assert!(matches!(
            config.load_strings("json", &["{}"]),
            Err(ConfigError::UnknownFormat(_))
        ));
        config.add_driver(crate::config::driver::YAML);
        assert!(config.has_decoder("yml"));
        assert!(config.has_encoder("yaml"));
        config.remove_driver("yaml");
        assert!(!config.has_decoder("yaml"));
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let config = Arc::new(loaded());
        let writer = {
            let config = Arc::clone(&config);
            thread::spawn(move || {
                for i in 0..100 {
                    config.set("counter", i).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let config = Arc::clone(&config);
                thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(config.get("map1.key"), Some(Value::from("val")));
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(config.get("counter"), Some(Value::from(99)));
    }
}
