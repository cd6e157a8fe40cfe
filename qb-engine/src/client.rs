use futures::stream::BoxStream;
use qb_core::model::ObjectKey;
use qb_core::prelude::*;

// The scope one command invocation operates in: everything needed to stamp
// provenance onto objects and to find them again on the server.
#[derive(Clone, Debug)]
pub struct EnvScope {
    pub app: String,
    pub tag: Option<String>,
    pub environment: String,
    pub default_namespace: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncAction {
    Identical,
    Skip,
    Created,
    Updated,
    Deleted,
}

#[derive(Clone, Debug)]
pub struct SyncResult {
    pub action: SyncAction,
    pub details: String,
    pub generated_name: Option<String>,
}

impl SyncResult {
    pub fn new(action: SyncAction, details: impl Into<String>) -> SyncResult {
        SyncResult { action, details: details.into(), generated_name: None }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub disable_create: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeleteOptions {
    pub dry_run: bool,
}

// Server-side listing scope for garbage collection: which namespaces to look
// in and whether cluster-scoped objects are in play.  The label selector is
// derived from app/environment/tag.
#[derive(Clone, Debug)]
pub struct ListQuery {
    pub application: String,
    pub environment: String,
    pub tag: Option<String>,
    pub namespaces: Vec<String>,
    pub include_cluster_objects: bool,
}

// An object as returned by the server; `namespaced` comes from discovery at
// list time so downstream code never has to guess scope again.
#[derive(Clone, Debug)]
pub struct RemoteObject {
    pub gvk: GVK,
    pub namespaced: bool,
    pub obj: DynamicObject,
}

impl RemoteObject {
    pub fn component(&self) -> Option<&str> {
        self.obj
            .metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(COMPONENT_ANNOTATION_KEY))
            .map(String::as_str)
    }

    pub fn identity(&self, default_ns: &str) -> ObjectKey {
        ObjectKey {
            group: self.gvk.group.clone(),
            kind: self.gvk.kind.clone(),
            namespace: if self.namespaced {
                self.obj.metadata.namespace.clone().unwrap_or_else(|| default_ns.into())
            } else {
                String::new()
            },
            name: self.obj.name_any(),
        }
    }

    pub fn display_name(&self) -> String {
        match &self.obj.metadata.namespace {
            Some(ns) => format!("{} {}/{}", self.gvk.kind, ns, self.obj.name_any()),
            None => format!("{} {}", self.gvk.kind, self.obj.name_any()),
        }
    }
}

pub type WatchStream = BoxStream<'static, anyhow::Result<DynamicObject>>;

// Everything the pipelines need from a cluster.  The kube-backed version
// lives in remote::KubeClient; tests get an automock.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait ClusterClient: Send + Sync {
    fn display_name(&self) -> String;

    // None means the server doesn't know the kind
    async fn is_namespaced(&self, gvk: &GVK) -> anyhow::Result<Option<bool>>;

    async fn get<'a>(&self, gvk: &GVK, namespace: Option<&'a str>, name: &str)
        -> anyhow::Result<Option<DynamicObject>>;

    async fn sync(&self, obj: &LocalObject, default_ns: &str, opts: SyncOptions) -> anyhow::Result<SyncResult>;

    async fn delete(&self, obj: &RemoteObject, opts: DeleteOptions) -> anyhow::Result<SyncResult>;

    async fn list_objects(&self, query: &ListQuery) -> anyhow::Result<Vec<RemoteObject>>;

    // a stream of current-state snapshots for one object, scoped by name
    async fn watch_object<'a>(&self, gvk: &GVK, namespace: Option<&'a str>, name: &str)
        -> anyhow::Result<WatchStream>;
}
