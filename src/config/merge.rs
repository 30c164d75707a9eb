//! Deep merge of decoded sources into the live tree.

use super::value::{Map, Value};

/// Merges `overlay` into `base`.
///
/// Maps present on both sides are merged recursively. Any other pairing,
/// lists included, is resolved by replacing the base value with the overlay.
pub(crate) fn deep_merge(base: &mut Map, overlay: Map) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Map(base_map)), Value::Map(overlay_map)) => {
                deep_merge(base_map, overlay_map);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Installs `source` as the whole tree when `data` is empty, otherwise merges it.
pub(crate) fn merge_source(data: &mut Map, source: Map) {
    if data.is_empty() {
        *data = source;
    } else {
        deep_merge(data, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(json: &str) -> Map {
        match serde_json::from_str::<Value>(json).unwrap() {
            Value::Map(map) => map,
            other => panic!("expected a map, got {}", other.kind()),
        }
    }

    #[test]
    fn test_scalar_override() {
        let mut base = map(r#"{"k": 1}"#);
        deep_merge(&mut base, map(r#"{"k": 2}"#));
        assert_eq!(base["k"], Value::from(2));
    }

    #[test]
    fn test_nested_maps_are_combined() {
        let mut base = map(r#"{"a": {"x": 1}}"#);
        deep_merge(&mut base, map(r#"{"a": {"y": 2}}"#));
        assert_eq!(base, map(r#"{"a": {"x": 1, "y": 2}}"#));
    }

    #[test]
    fn test_lists_are_replaced() {
        let mut base = map(r#"{"arr": [1, 2]}"#);
        deep_merge(&mut base, map(r#"{"arr": [3]}"#));
        assert_eq!(base["arr"], Value::from(vec![3]));
    }

    #[test]
    fn test_shape_changes_follow_overlay() {
        let mut base = map(r#"{"a": {"x": 1}, "b": "scalar"}"#);
        deep_merge(&mut base, map(r#"{"a": "flat", "b": {"now": "map"}}"#));
        assert_eq!(base, map(r#"{"a": "flat", "b": {"now": "map"}}"#));
    }

    #[test]
    fn test_merge_source_installs_first_tree() {
        let mut data = Map::new();
        merge_source(&mut data, map(r#"{"name": "app"}"#));
        merge_source(&mut data, map(r#"{"debug": true}"#));
        assert_eq!(data, map(r#"{"name": "app", "debug": true}"#));
    }
}
