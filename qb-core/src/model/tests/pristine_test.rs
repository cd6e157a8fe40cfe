use assertables::*;
use serde_json::json;

use super::*;
use crate::constants::*;

fn local_doc() -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": "cm1",
            "namespace": "test",
            "labels": {APPLICATION_LABEL_KEY: "example1"},
            "annotations": {COMPONENT_ANNOTATION_KEY: "service1"},
        },
        "data": {"foo": "bar"},
    })
}

#[rstest]
fn test_attach_then_extract_roundtrips() {
    let doc = local_doc();
    let sent = attach(&doc).unwrap();
    assert_some!(sent.pointer(&format!("/metadata/annotations/{}", PRISTINE_ANNOTATION_KEY.replace('/', "~1"))));

    // the server would add runtime fields before we see it again
    let mut server = sent.clone();
    server["metadata"]["uid"] = json!("abcd");
    server["metadata"]["resourceVersion"] = json!("42");
    server["status"] = json!({"phase": "ok"});

    let (previous, source) = extract(&server);
    assert_eq!(source, PristineSource::V1Annotation);
    assert_eq!(previous, doc);
}

#[rstest]
fn test_extract_reads_legacy_v0() {
    let doc = local_doc();
    let mut server = doc.clone();
    server["metadata"]["annotations"][PRISTINE_ANNOTATION_KEY_V0] =
        json!(serde_json::to_string(&doc).unwrap());

    let (previous, source) = extract(&server);
    assert_eq!(source, PristineSource::V0Annotation);
    assert_eq!(previous, doc);
}

#[rstest]
fn test_extract_falls_back_to_live_object() {
    let mut server = local_doc();
    server["metadata"]["uid"] = json!("abcd");
    server["status"] = json!({"phase": "ok"});

    let (previous, source) = extract(&server);
    assert_eq!(source, PristineSource::LiveObject);
    assert_eq!(previous, local_doc());
}

#[rstest]
fn test_extract_ignores_garbage_annotation() {
    let mut server = local_doc();
    server["metadata"]["annotations"][PRISTINE_ANNOTATION_KEY] = json!("!!not-base64!!");

    let (_, source) = extract(&server);
    assert_eq!(source, PristineSource::LiveObject);
}

#[rstest]
fn test_pristine_excludes_its_own_annotations() {
    let sent = attach(&local_doc()).unwrap();
    let p = pristine_of(&sent);
    assert_none!(p.pointer(&format!("/metadata/annotations/{}", PRISTINE_ANNOTATION_KEY.replace('/', "~1"))));
    // but the component annotation is intent, not runtime noise
    assert_some!(p.pointer(&format!("/metadata/annotations/{}", COMPONENT_ANNOTATION_KEY.replace('/', "~1"))));
}
