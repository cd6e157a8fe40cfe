mod diff_test;
mod lister_test;
mod sync_test;

use std::sync::Arc;

use qb_core::prelude::*;
use qb_testutils::*;
use rstest::*;
use serde_json as json;

use crate::client::*;
use crate::eval::*;

#[fixture]
pub fn scope() -> EnvScope {
    EnvScope {
        app: TEST_APP.into(),
        tag: None,
        environment: TEST_ENVIRONMENT.into(),
        default_namespace: TEST_NAMESPACE.into(),
    }
}

#[fixture]
pub fn ctx() -> EvalContext {
    EvalContext {
        environment: TEST_ENVIRONMENT.into(),
        default_namespace: TEST_NAMESPACE.into(),
        properties: json::Value::Null,
    }
}

// an evaluator that hands back canned objects per component
pub fn evaluator_returning(results: Vec<(&str, Vec<json::Value>)>) -> MockEvaluator {
    let canned: Vec<ComponentObjects> = results
        .into_iter()
        .map(|(component, objects)| ComponentObjects { component: component.into(), objects })
        .collect();
    let mut evaluator = MockEvaluator::new();
    evaluator.expect_components().returning(move |selected, _| {
        Ok(canned.iter().filter(|co| selected.contains(&co.component)).cloned().collect())
    });
    evaluator
}

// a mock client that knows the scope of the fixture kinds and nothing else
pub fn mock_client() -> MockClusterClient {
    let mut client = MockClusterClient::new();
    client.expect_display_name().return_const("test-cluster".to_string());
    client.expect_is_namespaced().returning(|gvk| {
        Ok(match gvk.kind.as_str() {
            "Namespace" | "CustomResourceDefinition" => Some(false),
            "Whatsit" => None,
            _ => Some(true),
        })
    });
    client
}

pub fn remote_configmap(name: &str, ns: &str, component: &str) -> RemoteObject {
    let obj = server_obj(json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": ns,
            "labels": {
                APPLICATION_LABEL_KEY: TEST_APP,
                ENVIRONMENT_LABEL_KEY: TEST_ENVIRONMENT,
            },
            "annotations": {COMPONENT_ANNOTATION_KEY: component},
        },
        "data": {"value": "remote"},
    }));
    RemoteObject { gvk: CM_GVK.clone(), namespaced: true, obj }
}
