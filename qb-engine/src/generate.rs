use std::collections::{
    HashMap,
    HashSet,
};

use qb_core::errors::*;
use qb_core::filter::ObjectFilter;
use qb_core::model::{
    ObjectKey,
    Provenance,
};
use qb_core::prelude::*;
use tracing::*;

use crate::client::{
    ClusterClient,
    EnvScope,
};
use crate::eval::{
    EvalContext,
    Evaluator,
};

// Everything downstream pipeline stages need from a generator run: the
// filtered objects to operate on, the identity of *every* rendered object
// (garbage collection must not delete objects that are merely filtered out
// of this invocation), and the discovered scope of every kind seen.
#[derive(Debug)]
pub struct GenerateResult {
    pub objects: Vec<LocalObject>,
    pub all_identities: HashSet<ObjectKey>,
    pub scopes: HashMap<GVK, Option<bool>>,
}

impl GenerateResult {
    pub fn scope_of(&self, gvk: &GVK) -> Option<bool> {
        self.scopes.get(gvk).copied().flatten()
    }

    pub fn has_cluster_objects(&self) -> bool {
        self.objects.iter().any(|o| self.scope_of(o.gvk()) == Some(false))
    }
}

pub async fn generate_objects(
    components: &[String],
    evaluator: &dyn Evaluator,
    client: &dyn ClusterClient,
    filter: &ObjectFilter,
    scope: &EnvScope,
    ctx: &EvalContext,
) -> anyhow::Result<GenerateResult> {
    let selected: Vec<String> = components.iter().filter(|c| filter.matches_component(c)).cloned().collect();
    let evaluated = evaluator.components(&selected, ctx).await?;

    let mut objects = vec![];
    for co in evaluated {
        let prov = Provenance {
            app: scope.app.clone(),
            tag: scope.tag.clone(),
            component: co.component,
            environment: scope.environment.clone(),
        };
        for raw in co.objects {
            objects.push(LocalObject::from_raw(raw, &prov)?);
        }
    }

    let scopes = resolve_scopes(client, &objects).await?;

    // names of namespaced objects get the tag suffix so that multiple tagged
    // deploys of one app can coexist in a namespace
    if scope.tag.is_some() {
        for obj in objects.iter_mut() {
            if scopes.get(obj.gvk()).copied().flatten() == Some(true) {
                obj.apply_tag_suffix();
            }
        }
    }

    check_duplicates(&objects, &scopes, &scope.default_namespace)?;

    let all_identities = objects
        .iter()
        .map(|o| {
            let namespaced = scopes.get(o.gvk()).copied().flatten().unwrap_or(true);
            o.identity(&scope.default_namespace, namespaced)
        })
        .collect();

    let before = objects.len();
    objects.retain(|o| {
        let ns = scopes.get(o.gvk()).copied().flatten();
        filter.matches(o, ns, &scope.default_namespace)
    });
    if objects.is_empty() && before > 0 {
        warn!("filters matched no objects (started with {before})");
    }

    Ok(GenerateResult { objects, all_identities, scopes })
}

async fn resolve_scopes(
    client: &dyn ClusterClient,
    objects: &[LocalObject],
) -> anyhow::Result<HashMap<GVK, Option<bool>>> {
    let mut scopes = HashMap::new();
    for obj in objects {
        if !scopes.contains_key(obj.gvk()) {
            let ns = client.is_namespaced(obj.gvk()).await?;
            if ns.is_none() {
                warn!("cluster does not recognize kind {}", obj.gvk());
            }
            scopes.insert(obj.gvk().clone(), ns);
        }
    }
    Ok(scopes)
}

// Objects with only a generateName can't collide before the server names
// them, so they're exempt here.
fn check_duplicates(
    objects: &[LocalObject],
    scopes: &HashMap<GVK, Option<bool>>,
    default_ns: &str,
) -> EmptyResult {
    let mut seen: HashMap<ObjectKey, String> = HashMap::new();
    for obj in objects {
        if obj.name().is_none() {
            continue;
        }
        let namespaced = scopes.get(obj.gvk()).copied().flatten().unwrap_or(true);
        let id = obj.identity(default_ns, namespaced);
        if let Some(prior) = seen.insert(id, obj.attributed_name()) {
            return Err(usage_error(format!("duplicate objects {} and {}", prior, obj.attributed_name())));
        }
    }
    Ok(())
}
