use std::collections::{
    BTreeSet,
    HashSet,
};
use std::sync::Arc;

use qb_core::errors::*;
use qb_core::filter::ObjectFilter;
use qb_core::model::{
    ObjectKey,
    Policy,
    annotation_policy,
};
use qb_core::prelude::*;
use tokio::sync::mpsc;
use tracing::*;

use crate::client::{
    ClusterClient,
    EnvScope,
    ListQuery,
    RemoteObject,
};
use crate::generate::GenerateResult;

// Lists server objects owned by this app/environment/tag in the background
// so the (potentially long) list overlaps the sync loop; the result is
// consumed exactly once, when deletion candidates are needed.
pub struct RemoteLister {
    rx: mpsc::Receiver<anyhow::Result<Vec<RemoteObject>>>,
    result: Option<Vec<RemoteObject>>,
    default_namespace: String,
}

impl RemoteLister {
    pub fn start(client: Arc<dyn ClusterClient>, r#gen: &GenerateResult, scope: &EnvScope) -> RemoteLister {
        // the server-side scope is the union of every namespace we render
        // into, plus cluster-scoped objects if we render any
        let mut namespaces = BTreeSet::from([scope.default_namespace.clone()]);
        for obj in &r#gen.objects {
            if r#gen.scope_of(obj.gvk()) == Some(true) {
                if let Some(ns) = obj.namespace() {
                    namespaces.insert(ns.to_string());
                }
            }
        }

        let query = ListQuery {
            application: scope.app.clone(),
            environment: scope.environment.clone(),
            tag: scope.tag.clone(),
            namespaces: namespaces.into_iter().collect(),
            include_cluster_objects: r#gen.has_cluster_objects(),
        };

        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            debug!("listing remote objects: {query:?}");
            let _ = tx.send(client.list_objects(&query).await).await;
        });

        RemoteLister {
            rx,
            result: None,
            default_namespace: scope.default_namespace.clone(),
        }
    }

    async fn join(&mut self) -> anyhow::Result<&Vec<RemoteObject>> {
        if self.result.is_none() {
            let res = self
                .rx
                .recv()
                .await
                .ok_or_else(|| anyhow!("remote list task went away without a result"))??;
            self.result = Some(res);
        }
        Ok(self.result.as_ref().unwrap())
    }

    // Every filter-admitted server object we own, excluding kinds whose
    // scope couldn't be determined.  The delete command works off this.
    pub async fn owned(&mut self, r#gen: &GenerateResult, filter: &ObjectFilter) -> anyhow::Result<Vec<RemoteObject>> {
        let default_ns = self.default_namespace.clone();
        let unknown: HashSet<GVK> = r#gen
            .scopes
            .iter()
            .filter(|(_, scope)| scope.is_none())
            .map(|(gvk, _)| gvk.clone())
            .collect();

        let mut owned: Vec<RemoteObject> = self
            .join()
            .await?
            .iter()
            .filter(|r| {
                !unknown.contains(&r.gvk)
                    && filter.matches_parts(
                        r.component(),
                        &r.gvk.kind,
                        r.obj.metadata.namespace.as_deref(),
                        Some(r.namespaced),
                        &default_ns,
                    )
            })
            .cloned()
            .collect();

        owned.sort_by_key(|r| r.identity(&default_ns));
        Ok(owned)
    }

    // Server objects that are safe to delete: owned by us, not rendered
    // locally (under any filter), and not retained.
    pub async fn deletions(
        &mut self,
        r#gen: &GenerateResult,
        retain: &HashSet<ObjectKey>,
        filter: &ObjectFilter,
    ) -> anyhow::Result<Vec<RemoteObject>> {
        let default_ns = self.default_namespace.clone();
        let candidates = self
            .owned(r#gen, filter)
            .await?
            .into_iter()
            .filter(|r| {
                let id = r.identity(&default_ns);
                !r#gen.all_identities.contains(&id) && !retain.contains(&id)
            })
            .collect();
        Ok(candidates)
    }

    // Namespaces that own at least one delete-policy:never object must never
    // be garbage collected themselves.
    pub async fn protected_namespaces(&mut self) -> anyhow::Result<HashSet<String>> {
        let protected = self
            .join()
            .await?
            .iter()
            .filter(|r| annotation_policy(&r.obj.metadata, DELETE_POLICY_DIRECTIVE_KEY) == Policy::Never)
            .filter_map(|r| r.obj.metadata.namespace.clone())
            .collect();
        Ok(protected)
    }
}
