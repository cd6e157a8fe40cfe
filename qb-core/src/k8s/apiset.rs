use std::collections::HashMap;
use std::collections::hash_map::Entry;

use kube::api::{
    ApiResource,
    DynamicObject,
};
use kube::discovery::{
    ApiCapabilities,
    Scope,
};

use crate::k8s::GVK;
use crate::k8s::KubernetesError;
use crate::errors::*;

// A DynamicApiSet caches the ApiResource/ApiCapabilities discovery data returned
// by the apiserver so that we don't repeatedly make "discovery" calls for the
// same kind.  Kinds the server doesn't recognize are cached as None: the engine
// must remember them (they're excluded from garbage collection, where guessing
// at their scope would be dangerous) rather than erroring out.
pub struct DynamicApiSet {
    client: kube::Client,
    resources: HashMap<GVK, Option<(ApiResource, ApiCapabilities)>>,
    apis: HashMap<(GVK, Option<String>), kube::Api<DynamicObject>>,
}

impl DynamicApiSet {
    pub fn new(client: kube::Client) -> DynamicApiSet {
        DynamicApiSet {
            client,
            resources: HashMap::new(),
            apis: HashMap::new(),
        }
    }

    // None means the cluster doesn't know the kind at all
    pub async fn is_namespaced(&mut self, gvk: &GVK) -> anyhow::Result<Option<bool>> {
        Ok(self
            .api_meta_for(gvk)
            .await?
            .as_ref()
            .map(|(_, cap)| cap.scope == Scope::Namespaced))
    }

    // A cluster-scoped handle when ns is None, a namespaced one otherwise
    pub async fn api_for(&mut self, gvk: &GVK, ns: Option<&str>) -> anyhow::Result<&kube::Api<DynamicObject>> {
        let ar = match self.api_meta_for(gvk).await? {
            Some((ar, _)) => ar.clone(),
            None => bail!(KubernetesError::unknown_kind(&gvk.to_string())),
        };
        match self.apis.entry((gvk.clone(), ns.map(String::from))) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let api = match &e.key().1 {
                    Some(ns) => kube::Api::namespaced_with(self.client.clone(), ns, &ar),
                    None => kube::Api::all_with(self.client.clone(), &ar),
                };
                Ok(e.insert(api))
            },
        }
    }

    async fn api_meta_for(&mut self, gvk: &GVK) -> anyhow::Result<&Option<(ApiResource, ApiCapabilities)>> {
        match self.resources.entry(gvk.clone()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => match kube::discovery::pinned_kind(&self.client, e.key()).await {
                Ok(api_meta) => Ok(e.insert(Some(api_meta))),
                Err(kube::Error::Api(resp)) if resp.code == 404 => Ok(e.insert(None)),
                Err(err) => Err(err.into()),
            },
        }
    }
}
