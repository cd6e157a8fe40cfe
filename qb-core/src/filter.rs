use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::errors::*;
use crate::k8s::effective_namespace;
use crate::model::LocalObject;

lazy_static! {
    // short forms accepted anywhere a kind can be filtered on, mirroring the
    // abbreviations kubectl users already know
    static ref KIND_ABBREVIATIONS: HashMap<&'static str, &'static str> = HashMap::from([
        ("cj", "CronJob"),
        ("cm", "ConfigMap"),
        ("crd", "CustomResourceDefinition"),
        ("deploy", "Deployment"),
        ("ds", "DaemonSet"),
        ("hpa", "HorizontalPodAutoscaler"),
        ("ing", "Ingress"),
        ("netpol", "NetworkPolicy"),
        ("no", "Node"),
        ("ns", "Namespace"),
        ("pdb", "PodDisruptionBudget"),
        ("po", "Pod"),
        ("pv", "PersistentVolume"),
        ("pvc", "PersistentVolumeClaim"),
        ("rs", "ReplicaSet"),
        ("sa", "ServiceAccount"),
        ("sc", "StorageClass"),
        ("secret", "Secret"),
        ("sts", "StatefulSet"),
        ("svc", "Service"),
    ]);
}

// One include-or-exclude list; setting both is a user mistake caught at
// construction so every command reports it the same way.
#[derive(Clone, Debug, Default)]
pub struct AxisFilter {
    includes: Vec<String>,
    excludes: Vec<String>,
}

impl AxisFilter {
    pub fn new(axis: &str, includes: Vec<String>, excludes: Vec<String>) -> anyhow::Result<AxisFilter> {
        if !includes.is_empty() && !excludes.is_empty() {
            return Err(usage_error(format!("cannot include as well as exclude {axis}s")));
        }
        Ok(AxisFilter { includes, excludes })
    }

    pub fn is_set(&self) -> bool {
        !self.includes.is_empty() || !self.excludes.is_empty()
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn matches(&self, value: &str) -> bool {
        if !self.includes.is_empty() {
            return self.includes.iter().any(|v| v == value);
        }
        !self.excludes.iter().any(|v| v == value)
    }

    fn matches_with(&self, value: &str, eq: impl Fn(&str, &str) -> bool) -> bool {
        if !self.includes.is_empty() {
            return self.includes.iter().any(|v| eq(v, value));
        }
        !self.excludes.iter().any(|v| eq(v, value))
    }
}

// true when `filter_value` (possibly an abbreviation or plural) names `kind`
fn kind_name_matches(filter_value: &str, kind: &str) -> bool {
    if filter_value.eq_ignore_ascii_case(kind) {
        return true;
    }
    let lower = filter_value.to_ascii_lowercase();
    if lower == format!("{}s", kind.to_ascii_lowercase()) {
        return true;
    }
    KIND_ABBREVIATIONS.get(lower.as_str()).is_some_and(|canonical| *canonical == kind)
}

// The filter every object command shares: three independent axes plus the
// cluster-object switch.  An object is admitted only when all axes admit it.
#[derive(Clone, Debug)]
pub struct ObjectFilter {
    components: AxisFilter,
    kinds: AxisFilter,
    namespaces: AxisFilter,
    include_cluster_objects: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FilterSpec {
    pub component_includes: Vec<String>,
    pub component_excludes: Vec<String>,
    pub kind_includes: Vec<String>,
    pub kind_excludes: Vec<String>,
    pub namespace_includes: Vec<String>,
    pub namespace_excludes: Vec<String>,
    // None means the user didn't say; it flips to false once a namespace
    // filter is in play, since asking for specific namespaces usually means
    // cluster-wide objects are noise
    pub include_cluster_objects: Option<bool>,
}

impl ObjectFilter {
    pub fn from_spec(spec: FilterSpec) -> anyhow::Result<ObjectFilter> {
        let namespaces = AxisFilter::new("namespace", spec.namespace_includes, spec.namespace_excludes)?;
        let include_cluster_objects = spec.include_cluster_objects.unwrap_or(!namespaces.is_set());
        Ok(ObjectFilter {
            components: AxisFilter::new("component", spec.component_includes, spec.component_excludes)?,
            kinds: AxisFilter::new("kind", spec.kind_includes, spec.kind_excludes)?,
            namespaces,
            include_cluster_objects,
        })
    }

    pub fn unfiltered() -> ObjectFilter {
        ObjectFilter {
            components: AxisFilter::default(),
            kinds: AxisFilter::default(),
            namespaces: AxisFilter::default(),
            include_cluster_objects: true,
        }
    }

    // the generator narrows the component set before evaluation
    pub fn component_includes(&self) -> &[String] {
        self.components.includes()
    }

    pub fn component_excludes(&self) -> &[String] {
        self.components.excludes()
    }

    pub fn matches_component(&self, component: &str) -> bool {
        self.components.matches(component)
    }

    pub fn matches_parts(
        &self,
        component: Option<&str>,
        kind: &str,
        namespace: Option<&str>,
        is_namespaced: Option<bool>,
        default_ns: &str,
    ) -> bool {
        if let Some(c) = component {
            if !self.components.matches(c) {
                return false;
            }
        }
        if !self.kinds.matches_with(kind, kind_name_matches) {
            return false;
        }

        match is_namespaced {
            Some(false) => {
                // cluster-scoped objects have no namespace to test; when a
                // namespace filter is active the switch decides
                !self.namespaces.is_set() || self.include_cluster_objects
            },
            _ => self.namespaces.matches(effective_namespace(namespace, default_ns)),
        }
    }

    pub fn matches(&self, obj: &LocalObject, is_namespaced: Option<bool>, default_ns: &str) -> bool {
        self.matches_parts(Some(&obj.component), obj.kind(), obj.namespace(), is_namespaced, default_ns)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;
    use crate::errors::is_usage_error;

    fn spec_with_kinds(includes: &[&str], excludes: &[&str]) -> FilterSpec {
        FilterSpec {
            kind_includes: includes.iter().map(|s| s.to_string()).collect(),
            kind_excludes: excludes.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[rstest]
    fn test_include_and_exclude_is_usage_error() {
        let err = ObjectFilter::from_spec(FilterSpec {
            component_includes: vec!["a".into()],
            component_excludes: vec!["b".into()],
            ..Default::default()
        })
        .unwrap_err();
        assert!(is_usage_error(&err));
        assert_eq!(format!("{err}"), "cannot include as well as exclude components");
    }

    #[rstest]
    #[case::canonical("ConfigMap")]
    #[case::lowercase("configmap")]
    #[case::plural("configmaps")]
    #[case::abbreviation("cm")]
    fn test_kind_forms_match(#[case] form: &str) {
        let f = ObjectFilter::from_spec(spec_with_kinds(&[form], &[])).unwrap();
        assert!(f.matches_parts(None, "ConfigMap", Some("ns1"), Some(true), "default"));
        assert!(!f.matches_parts(None, "Secret", Some("ns1"), Some(true), "default"));
    }

    #[rstest]
    fn test_kind_exclusion() {
        let f = ObjectFilter::from_spec(spec_with_kinds(&[], &["secret"])).unwrap();
        assert!(!f.matches_parts(None, "Secret", Some("ns1"), Some(true), "default"));
        assert!(f.matches_parts(None, "ConfigMap", Some("ns1"), Some(true), "default"));
    }

    #[rstest]
    fn test_namespace_filter_uses_effective_namespace() {
        let f = ObjectFilter::from_spec(FilterSpec {
            namespace_includes: vec!["ns1".into()],
            ..Default::default()
        })
        .unwrap();
        assert!(f.matches_parts(None, "ConfigMap", None, Some(true), "ns1"));
        assert!(!f.matches_parts(None, "ConfigMap", None, Some(true), "ns2"));
        assert!(f.matches_parts(None, "ConfigMap", Some("ns1"), Some(true), "ns2"));
    }

    #[rstest]
    fn test_namespace_filter_flips_cluster_objects_off() {
        let f = ObjectFilter::from_spec(FilterSpec {
            namespace_includes: vec!["ns1".into()],
            ..Default::default()
        })
        .unwrap();
        assert!(!f.matches_parts(None, "Namespace", None, Some(false), "default"));

        // but an explicit override wins
        let f = ObjectFilter::from_spec(FilterSpec {
            namespace_includes: vec!["ns1".into()],
            include_cluster_objects: Some(true),
            ..Default::default()
        })
        .unwrap();
        assert!(f.matches_parts(None, "Namespace", None, Some(false), "default"));
    }

    #[rstest]
    fn test_unfiltered_matches_everything() {
        let f = ObjectFilter::unfiltered();
        assert!(f.matches_parts(Some("x"), "Whatever", None, None, "default"));
    }

    // expanding an include list can only admit more objects; expanding an
    // exclude list can only reject more
    #[rstest]
    fn test_monotonicity() {
        let narrow = ObjectFilter::from_spec(spec_with_kinds(&["cm"], &[])).unwrap();
        let wide = ObjectFilter::from_spec(spec_with_kinds(&["cm", "secret"], &[])).unwrap();
        for kind in ["ConfigMap", "Secret", "Pod"] {
            if narrow.matches_parts(None, kind, None, Some(true), "d") {
                assert!(wide.matches_parts(None, kind, None, Some(true), "d"));
            }
        }

        let fewer = ObjectFilter::from_spec(spec_with_kinds(&[], &["cm"])).unwrap();
        let more = ObjectFilter::from_spec(spec_with_kinds(&[], &["cm", "secret"])).unwrap();
        for kind in ["ConfigMap", "Secret", "Pod"] {
            if more.matches_parts(None, kind, None, Some(true), "d") {
                assert!(fewer.matches_parts(None, kind, None, Some(true), "d"));
            }
        }
    }
}
