use kube::api::{
    Patch,
    PatchParams,
    PostParams,
};
use qb_core::errors::*;
use qb_core::jsonutils::merge_patch_diff;
use qb_core::k8s::obj_to_json;
use qb_core::model::pristine;
use qb_core::model::pristine::pristine_of;
use qb_core::model::{
    Policy,
    annotation_policy,
};
use qb_core::prelude::*;
use serde_json as json;

use super::KubeClient;
use crate::client::{
    SyncAction,
    SyncOptions,
    SyncResult,
};

// The per-object reconcile protocol.  Decisions are made the same way on a
// dry run, we just stop short of the mutating call.
pub(super) async fn sync_one(
    client: &KubeClient,
    obj: &LocalObject,
    default_ns: &str,
    opts: SyncOptions,
) -> anyhow::Result<SyncResult> {
    let gvk = obj.gvk();
    let namespaced = client
        .apiset
        .lock()
        .await
        .is_namespaced(gvk)
        .await?
        .ok_or_else(|| anyhow!("server does not recognize kind {gvk}"))?;

    let ns = namespaced.then(|| obj.namespace_or(default_ns).to_string());
    let api = client.api_for(gvk, ns.as_deref()).await?;

    // the effective local document: blank namespace resolved to the default
    let mut local = obj.to_json()?;
    if let Some(ns) = &ns {
        local["metadata"]["namespace"] = json::Value::String(ns.clone());
    }

    let existing = match obj.name() {
        Some(name) => api.get_opt(name).await?,
        None => None, // generateName objects are always fresh creates
    };

    let Some(server) = existing else {
        if opts.disable_create {
            return Ok(SyncResult::new(SyncAction::Skip, "creation skipped"));
        }
        if opts.dry_run {
            return Ok(SyncResult::new(SyncAction::Created, "created"));
        }

        let sent: DynamicObject = json::from_value(pristine::attach(&local)?)?;
        let created = api.create(&PostParams::default(), &sent).await?;
        let mut res = SyncResult::new(SyncAction::Created, "created");
        if obj.name().is_none() {
            res.generated_name = Some(created.name_any());
        }
        return Ok(res);
    };

    if obj.update_policy() == Policy::Never
        || annotation_policy(&server.metadata, UPDATE_POLICY_DIRECTIVE_KEY) == Policy::Never
    {
        return Ok(SyncResult::new(SyncAction::Skip, "update policy never"));
    }

    let server_doc = obj_to_json(&server)?;
    let (previous, source) = pristine::extract(&server_doc);

    // three-way: what changed between the previous intent and the new one,
    // applied on top of what the server has now
    let local_pristine = pristine_of(&local);
    let intent_patch = merge_patch_diff(&previous, &local_pristine);

    let server_clean = pristine_of(&server_doc);
    let mut merged = server_clean.clone();
    json_patch::merge(&mut merged, &intent_patch);

    if merged == server_clean {
        // nothing to do; deliberately does not rewrite a legacy v0 pristine
        // annotation, an untouched object stays byte-identical
        return Ok(SyncResult::new(SyncAction::Identical, format!("no change ({source})")));
    }

    if opts.dry_run {
        return Ok(SyncResult::new(SyncAction::Updated, format!("updated ({source})")));
    }

    // one merge patch carries both the field changes and the new pristine
    // annotation recording the local intent
    let target = pristine::attach_with(&merged, &local_pristine)?;
    let send_patch = merge_patch_diff(&server_clean, &target);
    api.patch(obj.name().unwrap_or_default(), &PatchParams::default(), &Patch::Merge(&send_patch))
        .await?;

    Ok(SyncResult::new(SyncAction::Updated, format!("updated ({source})")))
}
