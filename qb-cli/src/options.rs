use qb_core::errors::EmptyResult;

const OPTIONS_TEXT: &str = r#"Universal options accepted by qbec commands:

  --root <dir>             app root directory containing qbec.yaml
                           (env: QBEC_ROOT, default: current directory)
  --app-tag <tag>          tag this invocation so multiple instances of the
                           app can coexist in one environment; names of
                           namespaced objects get a -<tag> suffix and garbage
                           collection is scoped to the tag
  --yes                    assume "yes" for confirmation prompts
                           (env: QBEC_YES)
  --colors <bool>          force colored output on or off
  --verbosity <filter>     log filter for diagnostic output on stderr
  --force-k8s-context <c>  override the kubernetes context for all commands;
                           the special value __current__ means "whatever the
                           kubeconfig currently points at"
                           (env: QBEC_FORCE_K8S_CONTEXT)
  --force-k8s-namespace <ns>
                           override the default namespace similarly
                           (env: QBEC_FORCE_K8S_NAMESPACE)

Filters accepted by object commands (show, validate, apply, delete, diff):

  -c/--component, -C/--exclude-component
  -k/--kind,      -K/--exclude-kind
  -p/--namespace, -P/--exclude-namespace
  --include-cluster-objects <bool>

Including and excluding on the same axis is an error.  Kind filters accept
canonical names, plurals and the usual short forms (cm, svc, deploy, ...).

Exit codes: 0 on success, non-zero on any error; diff additionally exits
non-zero when differences are found and --error-exit is set."#;

pub fn cmd() -> EmptyResult {
    println!("{OPTIONS_TEXT}");
    Ok(())
}
