use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use kube::api::{
    DynamicObject,
    GroupVersionKind,
    TypeMeta,
};

use crate::errors::*;
use crate::k8s::KubernetesError;
use crate::prelude::*;

// GVK is a "newtype" wrapper around the metav1::GroupVersionKind object; it adds
// the conversion and formatting helpers the engine needs (objects are identified
// all over the place by their group/kind pair, and sort order is keyed on it).
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct GVK(GroupVersionKind);

impl GVK {
    pub fn new(group: &str, version: &str, kind: &str) -> GVK {
        GVK(GroupVersionKind::gvk(group, version, kind))
    }

    // apiVersion is either "group/version" or bare "version" for the core group
    pub fn from_api_version(api_version: &str, kind: &str) -> anyhow::Result<GVK> {
        let parts: Vec<_> = api_version.split('/').collect();
        match parts.len() {
            1 => Ok(GVK(GroupVersionKind::gvk("", parts[0], kind))),
            2 => Ok(GVK(GroupVersionKind::gvk(parts[0], parts[1], kind))),
            _ => bail!(KubernetesError::malformed_api_version(api_version)),
        }
    }

    pub fn from_dynamic_obj(obj: &DynamicObject) -> anyhow::Result<GVK> {
        match &obj.types {
            Some(t) => Ok(GVK(t.try_into()?)),
            None => bail!(KubernetesError::missing_type_info(&obj.name_any())),
        }
    }

    pub fn into_type_meta(&self) -> TypeMeta {
        TypeMeta {
            api_version: self.0.api_version(),
            kind: self.0.kind.clone(),
        }
    }

    // Sort order and identity ignore the version; two renderings of the same
    // object at different versions are still the same object.
    pub fn group_kind(&self) -> (String, String) {
        (self.0.group.clone(), self.0.kind.clone())
    }
}

// Impl Deref lets a GVK act like a GroupVersionKind anywhere one of those is expected
impl Deref for GVK {
    type Target = GroupVersionKind;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for GVK {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut group = Cow::from(&self.0.group);
        if !group.is_empty() {
            group.to_mut().push('/');
        }

        write!(f, "{group}{}.{}", self.0.version, self.0.kind)
    }
}
