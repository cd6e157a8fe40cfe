use kube::api::DynamicObject;
use qb_core::model::{
    LocalObject,
    Provenance,
};
use rstest::fixture;
use serde_json::json;

use crate::constants::*;

#[fixture]
pub fn test_prov(#[default(TEST_COMPONENT)] component: &str) -> Provenance {
    Provenance {
        app: TEST_APP.into(),
        tag: None,
        component: component.into(),
        environment: TEST_ENVIRONMENT.into(),
    }
}

pub fn raw_configmap(name: &str, ns: &str, value: &str) -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {"name": name, "namespace": ns},
        "data": {"value": value},
    })
}

pub fn raw_secret(name: &str, ns: &str, value: &str) -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {"name": name, "namespace": ns},
        "data": {"value": value},
    })
}

pub fn raw_deployment(name: &str, ns: &str, replicas: i64) -> serde_json::Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": name, "namespace": ns},
        "spec": {
            "replicas": replicas,
            "selector": {"matchLabels": {"app": name}},
            "template": {
                "metadata": {"labels": {"app": name}},
                "spec": {"containers": [{"name": name, "image": format!("{name}:latest")}]},
            },
        },
    })
}

pub fn raw_namespace(name: &str) -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {"name": name},
    })
}

#[fixture]
pub fn test_configmap(test_prov: Provenance) -> LocalObject {
    LocalObject::from_raw(raw_configmap("cm1", TEST_NAMESPACE, "v1"), &test_prov).unwrap()
}

#[fixture]
pub fn test_deployment(test_prov: Provenance) -> LocalObject {
    LocalObject::from_raw(raw_deployment("deploy1", TEST_NAMESPACE, 2), &test_prov).unwrap()
}

// what the server would hand back for a locally-rendered object: same doc
// plus the runtime fields the apiserver adds
pub fn as_server_copy(local: &LocalObject) -> DynamicObject {
    let mut doc = local.to_json().unwrap();
    doc["metadata"]["uid"] = json!("00000000-1111-2222-3333-444444444444");
    doc["metadata"]["resourceVersion"] = json!("12345");
    doc["metadata"]["creationTimestamp"] = json!("2024-01-01T00:00:00Z");
    serde_json::from_value(doc).unwrap()
}

pub fn server_obj(raw: serde_json::Value) -> DynamicObject {
    serde_json::from_value(raw).unwrap()
}
