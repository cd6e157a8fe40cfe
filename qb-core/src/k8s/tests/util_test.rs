use assertables::*;
use serde_json::json;

use super::*;

#[rstest]
fn test_strip_runtime_fields() {
    let mut doc = json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": "cm1",
            "namespace": "test",
            "uid": "abcd",
            "resourceVersion": "1234",
            "generation": 7,
            "creationTimestamp": "2024-01-01T00:00:00Z",
            "managedFields": [{}],
            "annotations": {
                "kubectl.kubernetes.io/last-applied-configuration": "{}",
                "some-annotation": "kept",
            },
        },
        "data": {"foo": "bar"},
        "status": {"phase": "Active"},
    });

    strip_runtime_fields(&mut doc);

    assert_none!(doc.get("status"));
    let meta = doc.pointer("/metadata").unwrap().as_object().unwrap();
    assert_none!(meta.get("uid"));
    assert_none!(meta.get("resourceVersion"));
    assert_none!(meta.get("generation"));
    assert_none!(meta.get("creationTimestamp"));
    assert_none!(meta.get("managedFields"));
    assert_eq!(doc.pointer("/metadata/annotations"), Some(&json!({"some-annotation": "kept"})));
    assert_eq!(doc.pointer("/data/foo"), Some(&json!("bar")));
}

#[rstest]
fn test_strip_runtime_fields_drops_empty_annotations() {
    let mut doc = json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": "cm1",
            "annotations": {
                "kubectl.kubernetes.io/last-applied-configuration": "{}",
            },
        },
    });

    strip_runtime_fields(&mut doc);
    assert_none!(doc.pointer("/metadata/annotations"));
}

#[rstest]
#[case::explicit(Some("ns1"), "ns1")]
#[case::blank(Some(""), "default-ns")]
#[case::missing(None, "default-ns")]
fn test_effective_namespace(#[case] obj_ns: Option<&str>, #[case] expected: &str) {
    assert_eq!(effective_namespace(obj_ns, "default-ns"), expected);
}
