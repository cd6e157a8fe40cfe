// Well-known labels and annotations
pub const LAST_APPLIED_CONFIG_ANNOTATION_KEY: &str = "kubectl.kubernetes.io/last-applied-configuration";
pub const KUBERNETES_IO_METADATA_NAME_KEY: &str = "kubernetes.io/metadata.name";

// qbec provenance labels and annotations; server objects carrying these are
// considered owned by the named application/environment (and tag, if any)
pub const APPLICATION_LABEL_KEY: &str = "qbec.io/application";
pub const ENVIRONMENT_LABEL_KEY: &str = "qbec.io/environment";
pub const TAG_LABEL_KEY: &str = "qbec.io/tag";
pub const COMPONENT_ANNOTATION_KEY: &str = "qbec.io/component";

// Pristine annotations; v1 is base64(gzip(json)), v0 is plain JSON and is
// only ever read, never written
pub const PRISTINE_ANNOTATION_KEY: &str = "pristine.qbec.io/v1";
pub const PRISTINE_ANNOTATION_KEY_V0: &str = "pristine.qbec.io/v0";

// Per-object directives
pub const APPLY_ORDER_DIRECTIVE_KEY: &str = "directives.qbec.io/apply-order";
pub const UPDATE_POLICY_DIRECTIVE_KEY: &str = "directives.qbec.io/update-policy";
pub const DELETE_POLICY_DIRECTIVE_KEY: &str = "directives.qbec.io/delete-policy";
pub const POLICY_VALUE_NEVER: &str = "never";

// Environments
pub const BASELINE_ENVIRONMENT: &str = "_";
pub const CURRENT_CONTEXT_SENTINEL: &str = "__current__";

// Env vars
pub const ROOT_ENV_VAR: &str = "QBEC_ROOT";
pub const ENV_FILE_ENV_VAR: &str = "QBEC_ENV_FILE";
pub const YES_ENV_VAR: &str = "QBEC_YES";
pub const FORCE_CONTEXT_ENV_VAR: &str = "QBEC_FORCE_K8S_CONTEXT";
pub const FORCE_NAMESPACE_ENV_VAR: &str = "QBEC_FORCE_K8S_NAMESPACE";

// Namespaces never deleted by garbage collection
pub const PROTECTED_NAMESPACES: &[&str] = &["default", "kube-system"];

// Timing
pub const DEFAULT_WAIT_TIMEOUT_SECONDS: u64 = 300;
pub const CLEANUP_GRACE_SECONDS: u64 = 5;
