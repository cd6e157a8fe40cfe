use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use qb_core::model::{
    Policy,
    annotation_policy,
};
use qb_core::prelude::*;
use qb_core::sort;
use tracing::*;

use crate::apply::ApplyStats;
use crate::client::{
    ClusterClient,
    DeleteOptions,
    RemoteObject,
    SyncAction,
};

// Deletes candidates in reverse apply order, honoring per-object delete
// policies and namespace protection.  Used by apply's garbage collection and
// by the delete command; `protected` is the set of namespaces that own at
// least one undeletable object.
pub async fn delete_objects(
    client: Arc<dyn ClusterClient>,
    mut candidates: Vec<RemoteObject>,
    protected: &HashSet<String>,
    dry_run: bool,
    stats: &mut ApplyStats,
) -> qb_core::errors::EmptyResult {
    candidates.sort_by_cached_key(|r| {
        (
            sort::order_of(&r.gvk, &r.obj.metadata, Some(r.namespaced)),
            r.gvk.kind.clone(),
            r.obj.metadata.namespace.clone().unwrap_or_default(),
            r.obj.name_any(),
        )
    });
    candidates.reverse();

    let dry = if dry_run { "[dry-run] " } else { "" };
    for rem in candidates {
        let disp = rem.display_name();
        if annotation_policy(&rem.obj.metadata, DELETE_POLICY_DIRECTIVE_KEY) == Policy::Never {
            info!("{dry}skip delete of {disp} (delete policy never)");
            stats.record(SyncAction::Skip, disp);
            continue;
        }
        if rem.gvk.kind == "Namespace" {
            let name = rem.obj.name_any();
            if PROTECTED_NAMESPACES.contains(&name.as_str()) || protected.contains(&name) {
                info!("{dry}skip delete of protected namespace {name}");
                stats.record(SyncAction::Skip, disp);
                continue;
            }
        }

        let res = client
            .delete(&rem, DeleteOptions { dry_run })
            .await
            .with_context(|| format!("{dry}delete {disp} failed"))?;
        info!("{dry}delete {disp}: {}", res.details);
        stats.record(res.action, disp);
    }
    Ok(())
}
