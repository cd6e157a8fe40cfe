use std::collections::BTreeMap;
use std::fmt;

use serde_json as json;
use tracing::*;

use super::ModelError;
use crate::constants::*;
use crate::errors::*;
use crate::k8s::effective_namespace;
use crate::prelude::*;

// Where an object came from: which app rendering, for which environment, out
// of which component.  The same provenance is stamped onto every object of one
// generator run.
#[derive(Clone, Debug)]
pub struct Provenance {
    pub app: String,
    pub tag: Option<String>,
    pub component: String,
    pub environment: String,
}

// The stable identity of an object within one rendering; version is excluded
// on purpose so that the same object rendered at two apiVersions collides.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ObjectKey {
    pub group: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{} {}", self.kind, self.name)
        } else {
            write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Policy {
    Default,
    Never,
}

// A local object is one document produced by evaluating a component for an
// environment, decorated with provenance labels/annotations so that server
// copies can be re-associated with their source later.
#[derive(Clone, Debug)]
pub struct LocalObject {
    obj: DynamicObject,
    gvk: GVK,
    pub app: String,
    pub tag: Option<String>,
    pub component: String,
    pub environment: String,
}

impl LocalObject {
    pub fn from_raw(raw: json::Value, prov: &Provenance) -> anyhow::Result<LocalObject> {
        let descr = raw
            .pointer("/metadata/name")
            .and_then(|n| n.as_str())
            .unwrap_or("<unknown>")
            .to_string();

        let obj: DynamicObject = json::from_value(raw)
            .map_err(|e| anyhow!("component {}: bad object {descr}: {e}", prov.component))?;

        let types = obj.types.as_ref().ok_or(ModelError::missing_api_version(&descr))?;
        ensure!(!types.api_version.is_empty(), ModelError::missing_api_version(&descr));
        ensure!(!types.kind.is_empty(), ModelError::missing_kind(&descr));
        ensure!(
            obj.metadata.name.as_deref().is_some_and(|n| !n.is_empty())
                || obj.metadata.generate_name.as_deref().is_some_and(|n| !n.is_empty()),
            ModelError::missing_name(&descr)
        );

        let gvk = GVK::from_api_version(&types.api_version, &types.kind)?;
        let mut local = LocalObject {
            obj,
            gvk,
            app: prov.app.clone(),
            tag: prov.tag.clone(),
            component: prov.component.clone(),
            environment: prov.environment.clone(),
        };
        local.decorate();
        Ok(local)
    }

    // provenance labels re-associate server copies with this app/env/tag; the
    // component rides in an annotation since component names aren't required
    // to be valid label values
    fn decorate(&mut self) {
        let labels = self.obj.metadata.labels.get_or_insert(BTreeMap::new());
        labels.insert(APPLICATION_LABEL_KEY.into(), self.app.clone());
        labels.insert(ENVIRONMENT_LABEL_KEY.into(), self.environment.clone());
        if let Some(tag) = &self.tag {
            labels.insert(TAG_LABEL_KEY.into(), tag.clone());
        }

        let annotations = self.obj.metadata.annotations.get_or_insert(BTreeMap::new());
        annotations.insert(COMPONENT_ANNOTATION_KEY.into(), self.component.clone());
    }

    // Tag suffixing happens once the generator knows the kind is namespaced;
    // cluster-scoped objects keep their names so that multiple tagged deploys
    // can share them.
    pub fn apply_tag_suffix(&mut self) {
        if let (Some(tag), Some(name)) = (&self.tag, &self.obj.metadata.name) {
            self.obj.metadata.name = Some(format!("{name}-{tag}"));
        }
    }

    pub fn gvk(&self) -> &GVK {
        &self.gvk
    }

    pub fn kind(&self) -> &str {
        &self.gvk.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.obj.metadata.name.as_deref()
    }

    pub fn generate_name(&self) -> Option<&str> {
        self.obj.metadata.generate_name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.obj.metadata.namespace.as_deref()
    }

    pub fn namespace_or<'a>(&'a self, default_ns: &'a str) -> &'a str {
        effective_namespace(self.namespace(), default_ns)
    }

    // cluster-scoped objects get an empty namespace in their identity so they
    // can't collide with namespaced ones of the same kind/name
    pub fn identity(&self, default_ns: &str, namespaced: bool) -> ObjectKey {
        ObjectKey {
            group: self.gvk.group.clone(),
            kind: self.gvk.kind.clone(),
            namespace: if namespaced { self.namespace_or(default_ns).to_string() } else { String::new() },
            name: self.name().unwrap_or_else(|| self.generate_name().unwrap_or("")).to_string(),
        }
    }

    pub fn display_name(&self) -> String {
        match (self.namespace(), self.name()) {
            (Some(ns), Some(n)) => format!("{} {ns}/{n}", self.kind()),
            (None, Some(n)) => format!("{} {n}", self.kind()),
            (_, None) => format!("{} {}*", self.kind(), self.generate_name().unwrap_or("")),
        }
    }

    // "ConfigMap cm1 (component: service1)", used by duplicate reporting
    pub fn attributed_name(&self) -> String {
        format!("{} {} (component: {})", self.kind(), self.name().unwrap_or_default(), self.component)
    }

    pub fn apply_order(&self) -> Option<i64> {
        parse_apply_order(&self.obj.metadata)
    }

    pub fn update_policy(&self) -> Policy {
        annotation_policy(&self.obj.metadata, UPDATE_POLICY_DIRECTIVE_KEY)
    }

    pub fn delete_policy(&self) -> Policy {
        annotation_policy(&self.obj.metadata, DELETE_POLICY_DIRECTIVE_KEY)
    }

    pub fn as_dynamic(&self) -> &DynamicObject {
        &self.obj
    }

    pub fn to_json(&self) -> anyhow::Result<json::Value> {
        Ok(json::to_value(&self.obj)?)
    }
}

fn annotation_of<'a>(meta: &'a metav1::ObjectMeta, key: &str) -> Option<&'a str> {
    meta.annotations.as_ref().and_then(|a| a.get(key)).map(String::as_str)
}

// Directives are consulted on both local and server copies, so these work on
// bare metadata.  Unparseable values fall back to the default behavior.
pub fn annotation_policy(meta: &metav1::ObjectMeta, key: &str) -> Policy {
    match annotation_of(meta, key) {
        Some(POLICY_VALUE_NEVER) => Policy::Never,
        Some("default") | None => Policy::Default,
        Some(other) => {
            warn!("ignoring unknown value {other:?} for {key} on {}", meta.name.as_deref().unwrap_or("?"));
            Policy::Default
        },
    }
}

pub fn parse_apply_order(meta: &metav1::ObjectMeta) -> Option<i64> {
    let val = annotation_of(meta, APPLY_ORDER_DIRECTIVE_KEY)?;
    match val.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(
                "ignoring unparseable {APPLY_ORDER_DIRECTIVE_KEY} value {val:?} on {}",
                meta.name.as_deref().unwrap_or("?")
            );
            None
        },
    }
}
