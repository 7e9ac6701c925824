//! Layered merging of configuration values
//!
//! Two merge flavours exist and they are intentionally not interchangeable:
//!
//! - [`deep_merge`] overlays recursively. Used for type-specific column
//!   overrides and for stacking crop variant definitions.
//! - [`override_known`] replaces whole top-level keys, and only keys the base
//!   already has or an allow list admits. Used for page-scoped overrides.

use serde_json::{Map, Value};

/// Deep merge `overlay` into `base`.
///
/// If both values are maps, keys are merged recursively with `overlay` taking
/// precedence. Arrays merge index by index, extra overlay entries are
/// appended. In every other combination `overlay` replaces `base`. Keys that
/// only exist in `base` are never removed.
///
/// # Examples
///
/// ```
/// use crop_tree::deep_merge;
/// use serde_json::json;
///
/// let mut base = json!({"a": 1, "b": {"x": 10, "y": 20}});
/// deep_merge(&mut base, &json!({"b": {"y": 25, "z": 30}, "c": 3}));
///
/// assert_eq!(base, json!({"a": 1, "b": {"x": 10, "y": 25, "z": 30}, "c": 3}));
/// ```
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                if let Some(base_value) = base_map.get_mut(key) {
                    deep_merge(base_value, overlay_value);
                } else {
                    base_map.insert(key.clone(), overlay_value.clone());
                }
            }
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            for (index, overlay_value) in overlay_items.iter().enumerate() {
                match base_items.get_mut(index) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => base_items.push(overlay_value.clone()),
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Shallow override of known keys.
///
/// Every key of `overlay` replaces the corresponding key of `base` wholesale
/// when `base` already contains it or `is_known` admits it. All other overlay
/// keys are ignored. Nested structures of `base` that the overlay does not
/// mention stay untouched.
///
/// Returns the keys that were ignored.
///
/// # Examples
///
/// ```
/// use crop_tree::override_known;
/// use serde_json::{json, Map, Value};
///
/// let mut base: Map<String, Value> = json!({"a": 1, "b": {"x": 1, "y": 2}})
///     .as_object().cloned().unwrap();
/// let overlay = json!({"b": {"x": 9}, "unknown": true}).as_object().cloned().unwrap();
///
/// let ignored = override_known(&mut base, &overlay, |_| false);
///
/// assert_eq!(Value::Object(base), json!({"a": 1, "b": {"x": 9}}));
/// assert_eq!(ignored, vec!["unknown".to_string()]);
/// ```
pub fn override_known<F>(
    base: &mut Map<String, Value>,
    overlay: &Map<String, Value>,
    is_known: F,
) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut ignored = Vec::new();

    for (key, overlay_value) in overlay {
        if base.contains_key(key) || is_known(key) {
            base.insert(key.clone(), overlay_value.clone());
        } else {
            ignored.push(key.clone());
        }
    }

    ignored
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_deep_merge_objects() {
        let mut base = json!({
            "a": 1,
            "b": { "x": 10, "y": 20 }
        });
        let overlay = json!({
            "b": { "y": 25, "z": 30 },
            "c": 3
        });

        deep_merge(&mut base, &overlay);

        assert_eq!(base["a"], 1);
        assert_eq!(base["b"]["x"], 10);
        assert_eq!(base["b"]["y"], 25);
        assert_eq!(base["b"]["z"], 30);
        assert_eq!(base["c"], 3);
    }

    #[test]
    fn test_deep_merge_keeps_base_key_order() {
        let mut base = json!({"first": 1, "second": 2});
        deep_merge(&mut base, &json!({"third": 3, "first": 10}));

        let keys: Vec<_> = base.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
        assert_eq!(base["first"], 10);
    }

    #[test]
    fn test_deep_merge_arrays_index_wise() {
        let mut base = json!({"items": [{"a": 1}, {"b": 2}]});
        deep_merge(&mut base, &json!({"items": [{"c": 3}, {"b": 20}, {"d": 4}]}));
        assert_eq!(
            base,
            json!({"items": [{"a": 1, "c": 3}, {"b": 20}, {"d": 4}]})
        );
    }

    #[test]
    fn test_deep_merge_scalar_replaces_map_and_back() {
        let mut base = json!({"a": {"nested": true}, "b": "flat"});
        deep_merge(&mut base, &json!({"a": false, "b": {"nested": 1}}));
        assert_eq!(base, json!({"a": false, "b": {"nested": 1}}));
    }

    #[test]
    fn test_deep_merge_with_empty_overlay_is_identity() {
        let original = json!({"a": {"b": [1, 2]}});
        let mut base = original.clone();
        deep_merge(&mut base, &json!({}));
        assert_eq!(base, original);
    }

    #[test]
    fn test_override_known_replaces_existing_keys_wholesale() {
        let mut base = map(json!({"type": "file", "appearance": {"collapse": true, "new": false}}));
        let overlay = map(json!({"appearance": {"collapse": false}}));

        let ignored = override_known(&mut base, &overlay, |_| false);

        assert!(ignored.is_empty());
        assert_eq!(
            Value::Object(base),
            json!({"type": "file", "appearance": {"collapse": false}})
        );
    }

    #[test]
    fn test_override_known_ignores_unknown_keys() {
        let mut base = map(json!({"a": 1}));
        let overlay = map(json!({"a": 2, "b": 3}));

        let ignored = override_known(&mut base, &overlay, |_| false);

        assert_eq!(ignored, vec!["b".to_string()]);
        assert_eq!(Value::Object(base), json!({"a": 2}));
    }

    #[test]
    fn test_override_known_accepts_allow_listed_keys() {
        let mut base = map(json!({"type": "file"}));
        let overlay = map(json!({"overrideChildTca": {"columns": {}}}));

        let ignored = override_known(&mut base, &overlay, |key| key == "overrideChildTca");

        assert!(ignored.is_empty());
        assert_eq!(
            Value::Object(base),
            json!({"type": "file", "overrideChildTca": {"columns": {}}})
        );
    }
}
