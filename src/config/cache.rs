//! Memoized typed reads.
//!
//! Entries are tagged with the tree generation they were computed from. A
//! lookup or insert from another generation never mixes with stored entries,
//! so a reader racing a writer cannot resurrect stale results.

use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub(crate) struct Cache {
    generation: u64,
    strings: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
    maps: HashMap<String, BTreeMap<String, String>>,
}

impl Cache {
    pub(crate) fn clear(&mut self) {
        self.strings.clear();
        self.lists.clear();
        self.maps.clear();
    }

    /// Prepares the cache for an insert at `generation`.
    /// Returns false when the insert comes from an older tree.
    fn sync(&mut self, generation: u64) -> bool {
        if generation > self.generation {
            self.clear();
            self.generation = generation;
        }
        generation == self.generation
    }

    pub(crate) fn string(&self, generation: u64, key: &str) -> Option<String> {
        self.fresh(generation)?.strings.get(key).cloned()
    }

    pub(crate) fn strings(&self, generation: u64, key: &str) -> Option<Vec<String>> {
        self.fresh(generation)?.lists.get(key).cloned()
    }

    pub(crate) fn string_map(
        &self,
        generation: u64,
        key: &str,
    ) -> Option<BTreeMap<String, String>> {
        self.fresh(generation)?.maps.get(key).cloned()
    }

    pub(crate) fn put_string(&mut self, generation: u64, key: &str, value: &str) {
        if self.sync(generation) {
            self.strings.insert(key.to_string(), value.to_string());
        }
    }

    pub(crate) fn put_strings(&mut self, generation: u64, key: &str, value: &[String]) {
        if self.sync(generation) {
            self.lists.insert(key.to_string(), value.to_vec());
        }
    }

    pub(crate) fn put_string_map(
        &mut self,
        generation: u64,
        key: &str,
        value: &BTreeMap<String, String>,
    ) {
        if self.sync(generation) {
            self.maps.insert(key.to_string(), value.clone());
        }
    }

    fn fresh(&self, generation: u64) -> Option<&Self> {
        (self.generation == generation).then_some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_generation() {
        let mut cache = Cache::default();
        cache.put_string(1, "name", "app");
        assert_eq!(cache.string(1, "name").as_deref(), Some("app"));
        assert!(cache.string(2, "name").is_none());
    }

    #[test]
    fn test_newer_generation_drops_entries() {
        let mut cache = Cache::default();
        cache.put_strings(1, "arr", &["a".to_string()]);
        cache.put_string(2, "name", "app");
        assert!(cache.strings(2, "arr").is_none());
        assert!(cache.strings(1, "arr").is_none());
    }

    #[test]
    fn test_stale_insert_is_ignored() {
        let mut cache = Cache::default();
        cache.put_string(3, "name", "new");
        cache.put_string(2, "name", "old");
        assert_eq!(cache.string(3, "name").as_deref(), Some("new"));
    }

    #[test]
    fn test_clear() {
        let mut cache = Cache::default();
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), "v".to_string());
        cache.put_string_map(0, "m", &map);
        assert_eq!(cache.string_map(0, "m"), Some(map));
        cache.clear();
        assert!(cache.string_map(0, "m").is_none());
    }
}
