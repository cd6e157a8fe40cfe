use serde_json::json;

// Discovery payloads matching what a real apiserver returns for the groups
// the test fixtures live in.  Only the resources tests touch are included.
pub fn core_v1_discovery() -> serde_json::Value {
    json!({
        "kind": "APIResourceList",
        "groupVersion": "v1",
        "resources": [
            {
                "name": "configmaps",
                "singularName": "configmap",
                "namespaced": true,
                "kind": "ConfigMap",
                "verbs": ["create","delete","deletecollection","get","list","patch","update","watch"],
                "shortNames": ["cm"],
            },
            {
                "name": "secrets",
                "singularName": "secret",
                "namespaced": true,
                "kind": "Secret",
                "verbs": ["create","delete","deletecollection","get","list","patch","update","watch"],
            },
            {
                "name": "services",
                "singularName": "service",
                "namespaced": true,
                "kind": "Service",
                "verbs": ["create","delete","deletecollection","get","list","patch","update","watch"],
                "shortNames": ["svc"],
            },
            {
                "name": "namespaces",
                "singularName": "namespace",
                "namespaced": false,
                "kind": "Namespace",
                "verbs": ["create","delete","get","list","patch","update","watch"],
                "shortNames": ["ns"],
            },
            {
                "name": "pods",
                "singularName": "pod",
                "namespaced": true,
                "kind": "Pod",
                "verbs": ["create","delete","deletecollection","get","list","patch","update","watch"],
                "shortNames": ["po"],
            },
        ],
    })
}

pub fn apps_v1_discovery() -> serde_json::Value {
    json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": "apps/v1",
        "resources": [
            {
                "name": "daemonsets",
                "singularName": "daemonset",
                "namespaced": true,
                "kind": "DaemonSet",
                "verbs": ["create","delete","deletecollection","get","list","patch","update","watch"],
                "shortNames": ["ds"],
            },
            {
                "name": "deployments",
                "singularName": "deployment",
                "namespaced": true,
                "kind": "Deployment",
                "verbs": ["create","delete","deletecollection","get","list","patch","update","watch"],
                "shortNames": ["deploy"],
            },
            {
                "name": "statefulsets",
                "singularName": "statefulset",
                "namespaced": true,
                "kind": "StatefulSet",
                "verbs": ["create","delete","deletecollection","get","list","patch","update","watch"],
                "shortNames": ["sts"],
            },
        ],
    })
}
