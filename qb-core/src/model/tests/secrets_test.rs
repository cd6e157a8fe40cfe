use assertables::*;
use serde_json::json;

use super::*;

#[rstest]
fn test_hide_secrets_redacts_values() {
    let mut doc = json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {"name": "s1"},
        "data": {"password": "aHVudGVyMg==", "token": "aHVudGVyMg=="},
        "stringData": {"other": "plaintext"},
    });

    hide_secrets(&mut doc);

    let pw = doc.pointer("/data/password").unwrap().as_str().unwrap();
    let tok = doc.pointer("/data/token").unwrap().as_str().unwrap();
    let other = doc.pointer("/stringData/other").unwrap().as_str().unwrap();

    assert_starts_with!(pw, "redacted.");
    assert_starts_with!(other, "redacted.");
    // equal inputs redact identically so diffs can show what changed
    assert_eq!(pw, tok);
    assert_ne!(pw, other);
}

#[rstest]
fn test_hide_secrets_leaves_other_kinds_alone() {
    let mut doc = json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {"name": "cm1"},
        "data": {"foo": "bar"},
    });

    hide_secrets(&mut doc);
    assert_eq!(doc.pointer("/data/foo"), Some(&json!("bar")));
}
