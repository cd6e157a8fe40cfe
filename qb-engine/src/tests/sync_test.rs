use assertables::*;
use qb_core::model::pristine;

use super::*;
use crate::remote::KubeClient;

fn sent_doc(value: &str) -> serde_json::Value {
    // what a previous apply would have written: decorated local doc plus the
    // pristine annotation
    let local = test_configmap(test_prov(TEST_COMPONENT));
    let mut doc = local.to_json().unwrap();
    doc["data"]["value"] = serde_json::json!(value);
    pristine::attach(&doc).unwrap()
}

fn with_runtime_fields(mut doc: serde_json::Value) -> serde_json::Value {
    doc["metadata"]["uid"] = serde_json::json!("abcd-1234");
    doc["metadata"]["resourceVersion"] = serde_json::json!("42");
    doc
}

fn cm_path(name: &str) -> String {
    core_resource_path(TEST_NAMESPACE, "configmaps", name)
}

#[rstest]
#[tokio::test]
async fn test_sync_creates_missing_object(test_configmap: LocalObject) {
    let (fake, client) = FakeApiserver::start();
    fake.serve_discovery()
        .missing(&cm_path("cm1"))
        .accept_create(&core_collection_path(TEST_NAMESPACE, "configmaps"), serde_json::json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "cm1", "namespace": TEST_NAMESPACE, "uid": "abcd"},
        }));

    let kc = KubeClient::new(client, "fake");
    let res = kc.sync(&test_configmap, TEST_NAMESPACE, SyncOptions::default()).await.unwrap();

    assert_eq!(res.action, SyncAction::Created);
    assert_none!(res.generated_name);
}

#[rstest]
#[tokio::test]
async fn test_sync_skips_creation_when_disabled(test_configmap: LocalObject) {
    let (fake, client) = FakeApiserver::start();
    fake.serve_discovery().missing(&cm_path("cm1"));

    let kc = KubeClient::new(client, "fake");
    let opts = SyncOptions { disable_create: true, ..Default::default() };
    let res = kc.sync(&test_configmap, TEST_NAMESPACE, opts).await.unwrap();

    assert_eq!(res.action, SyncAction::Skip);
}

#[rstest]
#[tokio::test]
async fn test_sync_returns_generated_name(test_prov: qb_core::model::Provenance) {
    let obj = LocalObject::from_raw(
        serde_json::json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"generateName": "run-", "namespace": TEST_NAMESPACE},
        }),
        &test_prov,
    )
    .unwrap();

    let (fake, client) = FakeApiserver::start();
    fake.serve_discovery()
        .accept_create(&core_collection_path(TEST_NAMESPACE, "configmaps"), serde_json::json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "run-x7k2p", "namespace": TEST_NAMESPACE},
        }));

    let kc = KubeClient::new(client, "fake");
    let res = kc.sync(&obj, TEST_NAMESPACE, SyncOptions::default()).await.unwrap();

    assert_eq!(res.action, SyncAction::Created);
    assert_eq!(res.generated_name.as_deref(), Some("run-x7k2p"));
}

#[rstest]
#[tokio::test]
async fn test_sync_unchanged_object_is_identical(test_configmap: LocalObject) {
    let (fake, client) = FakeApiserver::start();
    // no patch stub: a write here would 404 and fail the sync
    fake.serve_discovery()
        .object_at(&cm_path("cm1"), with_runtime_fields(sent_doc("v1")));

    let kc = KubeClient::new(client, "fake");
    let res = kc.sync(&test_configmap, TEST_NAMESPACE, SyncOptions::default()).await.unwrap();

    assert_eq!(res.action, SyncAction::Identical);
}

#[rstest]
#[tokio::test]
async fn test_sync_patches_changed_object(test_configmap: LocalObject) {
    let (fake, client) = FakeApiserver::start();
    fake.serve_discovery()
        .object_at(&cm_path("cm1"), with_runtime_fields(sent_doc("old-value")))
        .accept_patch(&cm_path("cm1"), with_runtime_fields(sent_doc("v1")));

    let kc = KubeClient::new(client, "fake");
    let res = kc.sync(&test_configmap, TEST_NAMESPACE, SyncOptions::default()).await.unwrap();

    assert_eq!(res.action, SyncAction::Updated);
}

#[rstest]
#[tokio::test]
async fn test_sync_dry_run_never_mutates(test_configmap: LocalObject) {
    let (fake, client) = FakeApiserver::start();
    // only discovery and the GET exist; any write 404s and fails the test
    fake.serve_discovery()
        .object_at(&cm_path("cm1"), with_runtime_fields(sent_doc("old-value")));

    let kc = KubeClient::new(client, "fake");
    let opts = SyncOptions { dry_run: true, ..Default::default() };
    let res = kc.sync(&test_configmap, TEST_NAMESPACE, opts).await.unwrap();

    assert_eq!(res.action, SyncAction::Updated);
}

#[rstest]
#[tokio::test]
async fn test_sync_respects_server_side_update_policy(test_configmap: LocalObject) {
    let mut server_doc = sent_doc("old-value");
    server_doc["metadata"]["annotations"][UPDATE_POLICY_DIRECTIVE_KEY] = serde_json::json!("never");

    let (fake, client) = FakeApiserver::start();
    fake.serve_discovery().object_at(&cm_path("cm1"), server_doc);

    let kc = KubeClient::new(client, "fake");
    let res = kc.sync(&test_configmap, TEST_NAMESPACE, SyncOptions::default()).await.unwrap();

    assert_eq!(res.action, SyncAction::Skip);
}

#[rstest]
#[tokio::test]
async fn test_sync_reads_legacy_v0_pristine(test_configmap: LocalObject) {
    // a server object written by a very old client: plain-JSON pristine
    let local = test_configmap.to_json().unwrap();
    let mut old = local.clone();
    old["data"]["value"] = serde_json::json!("old-value");
    let mut server_doc = old.clone();
    server_doc["metadata"]["annotations"][PRISTINE_ANNOTATION_KEY_V0] =
        serde_json::json!(serde_json::to_string(&old).unwrap());

    let (fake, client) = FakeApiserver::start();
    fake.serve_discovery()
        .object_at(&cm_path("cm1"), server_doc)
        .accept_patch(&cm_path("cm1"), with_runtime_fields(sent_doc("v1")));

    let kc = KubeClient::new(client, "fake");
    let res = kc.sync(&test_configmap, TEST_NAMESPACE, SyncOptions::default()).await.unwrap();

    assert_eq!(res.action, SyncAction::Updated);
    assert_contains!(res.details, PRISTINE_ANNOTATION_KEY_V0);
}

#[rstest]
#[tokio::test]
async fn test_sync_unknown_kind_is_an_error(test_prov: qb_core::model::Provenance) {
    let obj = LocalObject::from_raw(
        serde_json::json!({
            "apiVersion": "example.com/v1",
            "kind": "Whatsit",
            "metadata": {"name": "w1", "namespace": TEST_NAMESPACE},
        }),
        &test_prov,
    )
    .unwrap();

    let (fake, client) = FakeApiserver::start();
    fake.missing("/apis/example.com/v1");

    let kc = KubeClient::new(client, "fake");
    let err = kc.sync(&obj, TEST_NAMESPACE, SyncOptions::default()).await.unwrap_err();
    assert_contains!(format!("{err}"), "does not recognize");
}
