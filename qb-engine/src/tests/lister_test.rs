use std::collections::HashSet;

use assertables::*;
use qb_core::filter::{
    FilterSpec,
    ObjectFilter,
};
use qb_core::model::ObjectKey;

use super::*;
use crate::generate::generate_objects;
use crate::lister::RemoteLister;

async fn gen_for(objs: Vec<serde_json::Value>, scope: &EnvScope, ctx: &EvalContext) -> crate::generate::GenerateResult {
    let evaluator = evaluator_returning(vec![(TEST_COMPONENT, objs)]);
    let client = mock_client();
    generate_objects(&[TEST_COMPONENT.into()], &evaluator, &client, &ObjectFilter::unfiltered(), scope, ctx)
        .await
        .unwrap()
}

#[rstest]
#[tokio::test]
async fn test_deletions_are_server_minus_local(scope: EnvScope, ctx: EvalContext) {
    let r#gen = gen_for(vec![raw_configmap("cm1", TEST_NAMESPACE, "x")], &scope, &ctx).await;

    let mut client = mock_client();
    client.expect_list_objects().returning(|query| {
        // scope resolution: default namespace only, no cluster objects
        assert_eq!(query.namespaces, vec![TEST_NAMESPACE.to_string()]);
        assert!(!query.include_cluster_objects);
        Ok(vec![
            remote_configmap("cm1", TEST_NAMESPACE, TEST_COMPONENT),
            remote_configmap("cm2", TEST_NAMESPACE, TEST_COMPONENT),
        ])
    });

    let mut lister = RemoteLister::start(Arc::new(client), &r#gen, &scope);
    let deletions = lister.deletions(&r#gen, &HashSet::new(), &ObjectFilter::unfiltered()).await.unwrap();

    assert_eq!(deletions.len(), 1);
    assert_eq!(deletions[0].obj.metadata.name.as_deref(), Some("cm2"));
}

#[rstest]
#[tokio::test]
async fn test_retained_objects_survive(scope: EnvScope, ctx: EvalContext) {
    let r#gen = gen_for(vec![raw_configmap("cm1", TEST_NAMESPACE, "x")], &scope, &ctx).await;

    let mut client = mock_client();
    client
        .expect_list_objects()
        .returning(|_| Ok(vec![remote_configmap("job-x7k2p", TEST_NAMESPACE, TEST_COMPONENT)]));

    let retain = HashSet::from([ObjectKey {
        group: "".into(),
        kind: "ConfigMap".into(),
        namespace: TEST_NAMESPACE.into(),
        name: "job-x7k2p".into(),
    }]);

    let mut lister = RemoteLister::start(Arc::new(client), &r#gen, &scope);
    let deletions = lister.deletions(&r#gen, &retain, &ObjectFilter::unfiltered()).await.unwrap();
    assert_is_empty!(deletions);
}

#[rstest]
#[tokio::test]
async fn test_filtered_out_local_objects_are_not_deletable(scope: EnvScope, ctx: EvalContext) {
    // cm2 renders locally but a kind filter excludes it from this run; GC
    // must still treat it as ours
    let evaluator = evaluator_returning(vec![(
        TEST_COMPONENT,
        vec![raw_configmap("cm1", TEST_NAMESPACE, "x"), raw_secret("s1", TEST_NAMESPACE, "y")],
    )]);
    let client = mock_client();
    let filter = ObjectFilter::from_spec(FilterSpec {
        kind_includes: vec!["cm".into()],
        ..Default::default()
    })
    .unwrap();
    let r#gen = generate_objects(&[TEST_COMPONENT.into()], &evaluator, &client, &filter, &scope, &ctx)
        .await
        .unwrap();

    let mut client = mock_client();
    client.expect_list_objects().returning(|_| {
        let mut secret = remote_configmap("s1", TEST_NAMESPACE, TEST_COMPONENT);
        secret.gvk = SECRET_GVK.clone();
        secret.obj.types = Some(secret.gvk.into_type_meta());
        Ok(vec![secret])
    });

    let mut lister = RemoteLister::start(Arc::new(client), &r#gen, &scope);
    // even with no filter on the deletion side, local ownership wins
    let deletions = lister.deletions(&r#gen, &HashSet::new(), &ObjectFilter::unfiltered()).await.unwrap();
    assert_is_empty!(deletions);
}

#[rstest]
#[tokio::test]
async fn test_protected_namespaces(scope: EnvScope, ctx: EvalContext) {
    let r#gen = gen_for(vec![raw_configmap("cm1", TEST_NAMESPACE, "x")], &scope, &ctx).await;

    let mut client = mock_client();
    client.expect_list_objects().returning(|_| {
        let mut pinned = remote_configmap("pinned", "ns-keep", TEST_COMPONENT);
        pinned
            .obj
            .metadata
            .annotations
            .get_or_insert_default()
            .insert(DELETE_POLICY_DIRECTIVE_KEY.into(), "never".into());
        Ok(vec![pinned, remote_configmap("cm-other", "ns-free", TEST_COMPONENT)])
    });

    let mut lister = RemoteLister::start(Arc::new(client), &r#gen, &scope);
    let protected = lister.protected_namespaces().await.unwrap();
    assert_eq!(protected, HashSet::from(["ns-keep".to_string()]));
}
