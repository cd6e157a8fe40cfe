use rstest::*;
use serde_json::json;

use super::*;

#[rstest]
fn test_merge_patch_diff_roundtrip() {
    let orig = json!({
        "spec": {
            "replicas": 2,
            "paused": true,
            "template": {"labels": {"a": "b"}},
        },
    });
    let target = json!({
        "spec": {
            "replicas": 3,
            "template": {"labels": {"a": "b", "c": "d"}},
        },
    });

    let patch = merge_patch_diff(&orig, &target);
    assert_eq!(
        patch,
        json!({"spec": {"replicas": 3, "paused": null, "template": {"labels": {"c": "d"}}}})
    );

    let mut merged = orig.clone();
    json_patch::merge(&mut merged, &patch);
    assert_eq!(merged, target);
}

#[rstest]
fn test_merge_patch_diff_identical() {
    let doc = json!({"a": {"b": [1, 2, 3]}});
    assert_eq!(merge_patch_diff(&doc, &doc), json!({}));
}

#[rstest]
fn test_merge_patch_diff_replaces_arrays() {
    let orig = json!({"items": [1, 2, 3]});
    let target = json!({"items": [1, 2]});
    assert_eq!(merge_patch_diff(&orig, &target), json!({"items": [1, 2]}));
}

#[rstest]
fn test_hash_is_deterministic() {
    let v1 = json!({"x": 1, "y": [true, "z"]});
    let v2 = json!({"x": 1, "y": [true, "z"]});
    assert_eq!(hash(&v1), hash(&v2));
    assert_ne!(hash(&v1), hash(&json!({"x": 2})));
}
