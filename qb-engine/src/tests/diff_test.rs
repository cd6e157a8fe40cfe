use assertables::*;
use qb_core::filter::ObjectFilter;

use super::*;
use crate::diff::{
    DiffOptions,
    DiffStats,
    run,
};

fn opts() -> DiffOptions {
    DiffOptions { parallelism: 1, ..Default::default() }
}

#[rstest]
#[tokio::test]
async fn test_classification(scope: EnvScope, ctx: EvalContext) {
    // locally: a changed configmap and a brand-new secret; on the server: the
    // configmap (older value) and a leftover from a previous deploy
    let evaluator = evaluator_returning(vec![(
        TEST_COMPONENT,
        vec![raw_configmap("svc2-cm", TEST_NAMESPACE, "bar"), raw_secret("svc2-secret", TEST_NAMESPACE, "s3cr3t")],
    )]);

    let mut client = mock_client();
    client.expect_get().returning(|_, _, name| {
        Ok(match name {
            "svc2-cm" => Some(remote_configmap("svc2-cm", TEST_NAMESPACE, TEST_COMPONENT).obj),
            _ => None,
        })
    });
    client
        .expect_list_objects()
        .returning(|_| Ok(vec![remote_configmap("svc2-previous-deploy", TEST_NAMESPACE, TEST_COMPONENT)]));

    let mut stats = DiffStats::default();
    let err = run(
        Arc::new(client),
        &evaluator,
        &[TEST_COMPONENT.into()],
        &ObjectFilter::unfiltered(),
        &scope,
        &ctx,
        &DiffOptions { error_exit: true, ..opts() },
        &mut stats,
    )
    .await
    .unwrap_err();

    assert_eq!(stats.changes, vec!["ConfigMap test/svc2-cm"]);
    assert_eq!(stats.additions, vec!["Secret test/svc2-secret"]);
    assert_eq!(stats.deletions, vec!["ConfigMap test/svc2-previous-deploy"]);
    assert_contains!(format!("{err}"), "3 object(s) differ");
}

#[rstest]
#[tokio::test]
async fn test_identical_objects_are_same(scope: EnvScope, ctx: EvalContext) {
    let evaluator = evaluator_returning(vec![(TEST_COMPONENT, vec![raw_configmap("cm1", TEST_NAMESPACE, "x")])]);

    // the server copy is exactly what a previous apply would have written
    let mut client = mock_client();
    client.expect_get().returning(|_, _, _| {
        let local = qb_testutils::test_configmap(qb_testutils::test_prov(TEST_COMPONENT));
        let mut doc = local.to_json().unwrap();
        doc["metadata"]["namespace"] = serde_json::json!(TEST_NAMESPACE);
        doc["data"]["value"] = serde_json::json!("x");
        let sent = qb_core::model::pristine::attach(&doc).unwrap();
        Ok(Some(serde_json::from_value(sent).unwrap()))
    });
    client.expect_list_objects().returning(|_| Ok(vec![]));

    let mut stats = DiffStats::default();
    run(
        Arc::new(client),
        &evaluator,
        &[TEST_COMPONENT.into()],
        &ObjectFilter::unfiltered(),
        &scope,
        &ctx,
        &DiffOptions { error_exit: true, ..opts() },
        &mut stats,
    )
    .await
    .unwrap();

    assert_eq!(stats.same.len(), 1);
    assert_eq!(stats.findings(), 0);
}

#[rstest]
#[tokio::test]
async fn test_no_deletions_when_disabled(scope: EnvScope, ctx: EvalContext) {
    let evaluator = evaluator_returning(vec![(TEST_COMPONENT, vec![raw_configmap("cm1", TEST_NAMESPACE, "x")])]);

    let mut client = mock_client();
    client.expect_get().returning(|_, _, _| Ok(None));
    client.expect_list_objects().times(0);

    let mut stats = DiffStats::default();
    run(
        Arc::new(client),
        &evaluator,
        &[TEST_COMPONENT.into()],
        &ObjectFilter::unfiltered(),
        &scope,
        &ctx,
        &DiffOptions { show_deletions: false, ..opts() },
        &mut stats,
    )
    .await
    .unwrap();

    assert_eq!(stats.additions.len(), 1);
    assert_is_empty!(stats.deletions);
}

#[rstest]
#[tokio::test]
async fn test_ignored_labels_do_not_count_as_changes(scope: EnvScope, ctx: EvalContext) {
    let evaluator = evaluator_returning(vec![(TEST_COMPONENT, vec![raw_configmap("cm1", TEST_NAMESPACE, "x")])]);

    let mut client = mock_client();
    client.expect_get().returning(|_, _, _| {
        let local = qb_testutils::test_configmap(qb_testutils::test_prov(TEST_COMPONENT));
        let mut doc = local.to_json().unwrap();
        doc["metadata"]["namespace"] = serde_json::json!(TEST_NAMESPACE);
        doc["data"]["value"] = serde_json::json!("x");
        // server-side mutation of a label we've been told to ignore
        doc["metadata"]["labels"]["injected-by-webhook"] = serde_json::json!("yes");
        Ok(Some(serde_json::from_value(qb_core::model::pristine::attach(&doc).unwrap()).unwrap()))
    });
    client.expect_list_objects().returning(|_| Ok(vec![]));

    let mut stats = DiffStats::default();
    run(
        Arc::new(client),
        &evaluator,
        &[TEST_COMPONENT.into()],
        &ObjectFilter::unfiltered(),
        &scope,
        &ctx,
        &DiffOptions {
            ignore_labels: vec!["injected-by-webhook".into()],
            ..opts()
        },
        &mut stats,
    )
    .await
    .unwrap();

    assert_eq!(stats.same.len(), 1);
    assert_is_empty!(stats.changes);
}
