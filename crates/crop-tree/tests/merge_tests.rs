//! Integration tests for tree merging

use crop_tree::{ConfigTree, deep_merge};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn tree(value: Value) -> ConfigTree {
    ConfigTree::from_json(value).expect("fixture must be a map")
}

/// Small nested JSON maps with a limited key alphabet so merges collide often.
fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (0i64..5).prop_map(|n| json!(n)),
        "[a-c]{0,2}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop::collection::btree_map("[a-d]", inner, 0..4)
            .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
    })
}

fn arb_tree() -> impl Strategy<Value = ConfigTree> {
    prop::collection::btree_map("[a-d]", arb_value(), 0..4)
        .prop_map(|entries| ConfigTree::from(entries.into_iter().collect::<Map<_, _>>()))
}

#[test]
fn test_cascade_deep_then_known_key_override() {
    // Base column config, type override, then page override
    let mut column = tree(json!({"config": {"a": 1, "b": 2}}));
    column.deep_merge(&tree(json!({"config": {"b": 3, "c": 4}})));

    let mut config = column.subtree("config").unwrap();
    config.override_known(&tree(json!({"b": 5})), |_| false);

    assert_eq!(config.into_json(), json!({"a": 1, "b": 5, "c": 4}));
}

#[test]
fn test_known_key_override_is_not_deep() {
    let mut config = tree(json!({
        "overrideChildTca": {"columns": {"crop": {"config": {"type": "imageManipulation"}}}}
    }));
    config.override_known(
        &tree(json!({"overrideChildTca": {"columns": {"crop": {"label": "Crop"}}}})),
        |_| false,
    );

    // The override replaced the key wholesale: the nested "config" is gone
    assert_eq!(config.get("overrideChildTca.columns.crop.config"), None);
    assert_eq!(
        config.get("overrideChildTca.columns.crop.label"),
        Some(&json!("Crop"))
    );
}

proptest! {
    #[test]
    fn prop_deep_merge_is_idempotent(base in arb_tree(), overlay in arb_tree()) {
        let once = base.clone().merged(&overlay);
        let twice = once.clone().merged(&overlay);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_deep_merge_never_drops_base_keys(base in arb_tree(), overlay in arb_tree()) {
        let merged = base.clone().merged(&overlay);
        for key in base.keys() {
            prop_assert!(merged.contains_key(key));
        }
    }

    #[test]
    fn prop_overlay_scalars_win(base in arb_value(), overlay in arb_value()) {
        let mut merged = base;
        deep_merge(&mut merged, &overlay);
        if !overlay.is_object() && !overlay.is_array() {
            prop_assert_eq!(merged, overlay);
        }
    }

    #[test]
    fn prop_override_known_never_adds_unknown_keys(base in arb_tree(), overlay in arb_tree()) {
        let mut config = base.clone();
        let ignored = config.override_known(&overlay, |_| false);
        prop_assert_eq!(config.len(), base.len());
        for key in ignored {
            prop_assert!(!base.contains_key(&key));
        }
    }
}
