use kube::api::DynamicObject;
use serde_json as json;

use crate::constants::*;

// metadata fields the server owns; these never participate in comparisons
// or in the pristine form of an object
const RUNTIME_METADATA_FIELDS: &[&str] = &[
    "creationTimestamp",
    "deletionTimestamp",
    "deletionGracePeriodSeconds",
    "generation",
    "managedFields",
    "resourceVersion",
    "selfLink",
    "uid",
];

pub fn obj_to_json(obj: &DynamicObject) -> anyhow::Result<json::Value> {
    Ok(json::to_value(obj)?)
}

// Reduce a server document to the fields a user actually intends: no status,
// no server-owned metadata, no server-injected annotations.
pub fn strip_runtime_fields(doc: &mut json::Value) {
    if let Some(map) = doc.as_object_mut() {
        map.remove("status");
    }

    if let Some(meta) = doc.pointer_mut("/metadata").and_then(|m| m.as_object_mut()) {
        for f in RUNTIME_METADATA_FIELDS {
            meta.remove(*f);
        }

        let mut drop_annotations = false;
        if let Some(ann) = meta.get_mut("annotations").and_then(|a| a.as_object_mut()) {
            ann.remove(LAST_APPLIED_CONFIG_ANNOTATION_KEY);
            drop_annotations = ann.is_empty();
        }
        if drop_annotations {
            meta.remove("annotations");
        }
    }
}

pub fn effective_namespace<'a>(obj_ns: Option<&'a str>, default_ns: &'a str) -> &'a str {
    match obj_ns {
        Some(ns) if !ns.is_empty() => ns,
        _ => default_ns,
    }
}
