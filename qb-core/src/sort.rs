use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::k8s::GVK;
use crate::model::{
    LocalObject,
    parse_apply_order,
};
use crate::prelude::*;

// Buckets for kinds without a table entry; scope decides where they land
// relative to the known kinds.
const UNKNOWN_CLUSTER_SCOPED_ORDER: i64 = 30;
const UNKNOWN_NAMESPACED_ORDER: i64 = 80;
const UNKNOWN_SCOPE_ORDER: i64 = 120;

lazy_static! {
    // Apply precedence by (group, kind).  Policies and type definitions go
    // first, then namespaces, then things workloads depend on, then the
    // workloads themselves, then objects that route to or gate on them.
    static ref KIND_ORDER: HashMap<(&'static str, &'static str), i64> = HashMap::from([
        (("policy", "PodSecurityPolicy"), 10),
        (("extensions", "PodSecurityPolicy"), 10),
        (("apiextensions.k8s.io", "CustomResourceDefinition"), 15),
        (("extensions", "ThirdPartyResource"), 15),
        (("", "Namespace"), 20),
        (("", "ServiceAccount"), 40),
        (("", "LimitRange"), 45),
        (("", "ConfigMap"), 50),
        (("", "Secret"), 50),
        (("apps", "DaemonSet"), 90),
        (("extensions", "DaemonSet"), 90),
        (("apps", "Deployment"), 90),
        (("extensions", "Deployment"), 90),
        (("apps", "ReplicaSet"), 90),
        (("extensions", "ReplicaSet"), 90),
        (("apps", "StatefulSet"), 90),
        (("batch", "Job"), 90),
        (("batch", "CronJob"), 90),
        (("", "Service"), 100),
        (("admissionregistration.k8s.io", "ValidatingWebhookConfiguration"), 110),
        (("admissionregistration.k8s.io", "MutatingWebhookConfiguration"), 110),
    ]);
}

// Works on bare metadata so both locally-rendered and server-listed objects
// sort the same way; deletion candidates only exist as server objects.
pub fn order_of(gvk: &GVK, meta: &metav1::ObjectMeta, is_namespaced: Option<bool>) -> i64 {
    if let Some(n) = parse_apply_order(meta) {
        if n > 0 {
            return n;
        }
    }

    let (group, kind) = gvk.group_kind();
    if let Some(&order) = KIND_ORDER.get(&(group.as_str(), kind.as_str())) {
        return order;
    }

    match is_namespaced {
        Some(false) => UNKNOWN_CLUSTER_SCOPED_ORDER,
        Some(true) => UNKNOWN_NAMESPACED_ORDER,
        None => UNKNOWN_SCOPE_ORDER,
    }
}

pub fn apply_order(obj: &LocalObject, is_namespaced: Option<bool>) -> i64 {
    order_of(obj.gvk(), &obj.as_dynamic().metadata, is_namespaced)
}

// Stable sort on (order, kind, component, namespace, name).  The scope map
// comes from discovery; kinds missing from it sort into the unknown-scope
// bucket rather than failing.
pub fn sort_for_apply(objs: &mut [LocalObject], scopes: &HashMap<GVK, Option<bool>>) {
    objs.sort_by_cached_key(|o| {
        let scope = scopes.get(o.gvk()).copied().flatten();
        (
            apply_order(o, scope),
            o.kind().to_string(),
            o.component.clone(),
            o.namespace().unwrap_or_default().to_string(),
            o.name().unwrap_or_default().to_string(),
        )
    });
}

// Deletions run dependents-first, which is exactly the apply order reversed.
pub fn sort_for_delete(objs: &mut [LocalObject], scopes: &HashMap<GVK, Option<bool>>) {
    sort_for_apply(objs, scopes);
    objs.reverse();
}
