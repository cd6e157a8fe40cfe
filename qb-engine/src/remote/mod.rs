mod sync;

use futures::stream::{
    StreamExt,
    TryStreamExt,
};
use kube::api::{
    DeleteParams,
    ListParams,
};
use kube::discovery::{
    Scope,
    verbs,
};
use kube::runtime::watcher;
use qb_core::errors::*;
use qb_core::k8s::DynamicApiSet;
use qb_core::prelude::*;
use tracing::*;

use crate::client::{
    ClusterClient,
    DeleteOptions,
    ListQuery,
    RemoteObject,
    SyncAction,
    SyncOptions,
    SyncResult,
    WatchStream,
};

// Kinds that carry our labels but must never be treated as deployable or
// collectable objects.
const LIST_DENYLIST: &[(&str, &str)] = &[
    ("", "ComponentStatus"),
    ("", "Event"),
    ("events.k8s.io", "Event"),
];

pub struct KubeClient {
    client: kube::Client,
    apiset: tokio::sync::Mutex<DynamicApiSet>,
    display: String,
}

impl KubeClient {
    pub fn new(client: kube::Client, display: impl Into<String>) -> KubeClient {
        KubeClient {
            apiset: tokio::sync::Mutex::new(DynamicApiSet::new(client.clone())),
            client,
            display: display.into(),
        }
    }

    pub(crate) async fn api_for(&self, gvk: &GVK, ns: Option<&str>) -> anyhow::Result<kube::Api<DynamicObject>> {
        Ok(self.apiset.lock().await.api_for(gvk, ns).await?.clone())
    }

    fn selector_for(query: &ListQuery) -> String {
        let mut sel = format!(
            "{APPLICATION_LABEL_KEY}={},{ENVIRONMENT_LABEL_KEY}={}",
            query.application, query.environment
        );
        match &query.tag {
            // an untagged apply must not see (or collect) tagged instances
            Some(tag) => sel.push_str(&format!(",{TAG_LABEL_KEY}={tag}")),
            None => sel.push_str(&format!(",!{TAG_LABEL_KEY}")),
        }
        sel
    }
}

#[async_trait::async_trait]
impl ClusterClient for KubeClient {
    fn display_name(&self) -> String {
        self.display.clone()
    }

    async fn is_namespaced(&self, gvk: &GVK) -> anyhow::Result<Option<bool>> {
        self.apiset.lock().await.is_namespaced(gvk).await
    }

    async fn get<'a>(
        &self,
        gvk: &GVK,
        namespace: Option<&'a str>,
        name: &str,
    ) -> anyhow::Result<Option<DynamicObject>> {
        let api = self.api_for(gvk, namespace).await?;
        Ok(api.get_opt(name).await?)
    }

    async fn sync(&self, obj: &LocalObject, default_ns: &str, opts: SyncOptions) -> anyhow::Result<SyncResult> {
        sync::sync_one(self, obj, default_ns, opts).await
    }

    async fn delete(&self, obj: &RemoteObject, opts: DeleteOptions) -> anyhow::Result<SyncResult> {
        if opts.dry_run {
            return Ok(SyncResult::new(SyncAction::Deleted, "deleted (dry-run)"));
        }
        debug!("deleting {}", obj.obj.namespaced_name());
        let ns = obj.namespaced.then(|| obj.obj.metadata.namespace.clone()).flatten();
        let api = self.api_for(&obj.gvk, ns.as_deref()).await?;
        api.delete(&obj.obj.name_any(), &DeleteParams::default()).await?;
        Ok(SyncResult::new(SyncAction::Deleted, "deleted"))
    }

    // One full-discovery sweep, then a list per (kind, namespace) in scope.
    // Runs as a single background task started before the sync loop, so the
    // request fan-out here overlaps with sync round-trips.
    async fn list_objects(&self, query: &ListQuery) -> anyhow::Result<Vec<RemoteObject>> {
        let selector = Self::selector_for(query);
        let lp = ListParams::default().labels(&selector);
        let discovery = kube::Discovery::new(self.client.clone()).run().await?;

        let mut results = vec![];
        for group in discovery.groups() {
            for (ar, caps) in group.recommended_resources() {
                if !caps.supports_operation(verbs::LIST)
                    || LIST_DENYLIST.contains(&(ar.group.as_str(), ar.kind.as_str()))
                {
                    continue;
                }
                let gvk = GVK::new(&ar.group, &ar.version, &ar.kind);

                match caps.scope {
                    Scope::Namespaced => {
                        for ns in &query.namespaces {
                            let api = kube::Api::<DynamicObject>::namespaced_with(self.client.clone(), ns, &ar);
                            for obj in api.list(&lp).await?.items {
                                results.push(RemoteObject { gvk: gvk.clone(), namespaced: true, obj });
                            }
                        }
                    },
                    Scope::Cluster => {
                        if !query.include_cluster_objects {
                            continue;
                        }
                        let api = kube::Api::<DynamicObject>::all_with(self.client.clone(), &ar);
                        for obj in api.list(&lp).await?.items {
                            results.push(RemoteObject { gvk: gvk.clone(), namespaced: false, obj });
                        }
                    },
                }
            }
        }

        debug!("server reported {} object(s) for {selector}", results.len());
        Ok(results)
    }

    async fn watch_object<'a>(
        &self,
        gvk: &GVK,
        namespace: Option<&'a str>,
        name: &str,
    ) -> anyhow::Result<WatchStream> {
        let api = self.api_for(gvk, namespace).await?;
        let config = watcher::Config::default().fields(&format!("metadata.name={name}"));
        let stream = watcher(api, config)
            .map_err(anyhow::Error::from)
            .try_filter_map(|evt| async move {
                Ok(match evt {
                    watcher::Event::Apply(obj) | watcher::Event::InitApply(obj) => Some(obj),
                    _ => None,
                })
            })
            .boxed();
        Ok(stream)
    }
}
