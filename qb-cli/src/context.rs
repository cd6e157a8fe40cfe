use std::path::PathBuf;
use std::sync::Arc;

use qb_core::errors::*;
use qb_core::filter::{
    FilterSpec,
    ObjectFilter,
};
use qb_core::prelude::*;
use qb_engine::client::{
    ClusterClient,
    EnvScope,
};
use qb_engine::eval::EvalContext;
use qb_engine::prompt::StdinPrompter;
use qb_engine::remote::KubeClient;

use crate::app::{
    App,
    Environment,
};
use crate::evaluator::FileEvaluator;

// Filter flags shared by every command that renders objects.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct FilterArgs {
    #[arg(short = 'c', long = "component", long_help = "include components")]
    pub components: Vec<String>,

    #[arg(short = 'C', long = "exclude-component", long_help = "exclude components")]
    pub exclude_components: Vec<String>,

    #[arg(short = 'k', long = "kind", long_help = "include objects of these kinds")]
    pub kinds: Vec<String>,

    #[arg(short = 'K', long = "exclude-kind", long_help = "exclude objects of these kinds")]
    pub exclude_kinds: Vec<String>,

    #[arg(short = 'p', long = "namespace", long_help = "include objects in these namespaces")]
    pub namespaces: Vec<String>,

    #[arg(short = 'P', long = "exclude-namespace", long_help = "exclude objects in these namespaces")]
    pub exclude_namespaces: Vec<String>,

    #[arg(
        long,
        long_help = "include cluster-scoped objects (defaults to false when a namespace filter is set)"
    )]
    pub include_cluster_objects: Option<bool>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> anyhow::Result<ObjectFilter> {
        ObjectFilter::from_spec(FilterSpec {
            component_includes: self.components.clone(),
            component_excludes: self.exclude_components.clone(),
            kind_includes: self.kinds.clone(),
            kind_excludes: self.exclude_kinds.clone(),
            namespace_includes: self.namespaces.clone(),
            namespace_excludes: self.exclude_namespaces.clone(),
            include_cluster_objects: self.include_cluster_objects,
        })
    }
}

// Everything a subcommand needs that comes from global flags rather than its
// own: the loaded app, forced overrides, confirmation behavior.
pub struct CommandContext {
    pub app: App,
    pub root: PathBuf,
    pub auto_yes: bool,
    pub colorize: bool,
    force_context: Option<String>,
    force_namespace: Option<String>,
}

impl CommandContext {
    pub fn new(
        root: PathBuf,
        app: App,
        auto_yes: bool,
        colorize: bool,
        force_context: Option<String>,
        force_namespace: Option<String>,
    ) -> CommandContext {
        CommandContext { app, root, auto_yes, colorize, force_context, force_namespace }
    }

    // The "__current__" sentinel resolves to "whatever the kubeconfig says",
    // which for client construction means no explicit override.  Resolved
    // values are authoritative from here on; the sentinel goes no further.
    fn resolved_context(&self, env: &Environment) -> Option<String> {
        match self.force_context.as_deref() {
            Some(CURRENT_CONTEXT_SENTINEL) => None,
            Some(forced) => Some(forced.to_string()),
            None => env.context.clone(),
        }
    }

    pub fn resolved_namespace(&self, env: &Environment) -> String {
        match self.force_namespace.as_deref() {
            Some(CURRENT_CONTEXT_SENTINEL) | None => env.default_namespace.clone(),
            Some(forced) => forced.to_string(),
        }
    }

    pub fn env_scope(&self, env_name: &str) -> anyhow::Result<(EnvScope, Environment)> {
        let env = self.app.environment(env_name)?;
        let scope = EnvScope {
            app: self.app.name().to_string(),
            tag: self.app.tag().map(String::from),
            environment: env_name.to_string(),
            default_namespace: self.resolved_namespace(&env),
        };
        Ok((scope, env))
    }

    pub fn eval_ctx(&self, env_name: &str) -> anyhow::Result<EvalContext> {
        let (scope, _) = self.env_scope(env_name)?;
        Ok(EvalContext {
            environment: scope.environment,
            default_namespace: scope.default_namespace,
            properties: self.app.properties_for(env_name)?,
        })
    }

    pub fn evaluator(&self) -> FileEvaluator {
        FileEvaluator::new(self.app.components_dir())
    }

    pub fn prompter(&self) -> StdinPrompter {
        StdinPrompter { auto_yes: self.auto_yes }
    }

    pub async fn cluster_client(&self, env_name: &str, env: &Environment) -> anyhow::Result<Arc<dyn ClusterClient>> {
        if env_name == BASELINE_ENVIRONMENT {
            return Err(usage_error("cannot connect a cluster client for the baseline environment"));
        }

        let context = self.resolved_context(env);
        let options = kube::config::KubeConfigOptions {
            context: context.clone(),
            ..Default::default()
        };
        let config = kube::Config::from_kubeconfig(&options)
            .await
            .map_err(|e| anyhow!("unable to load kubeconfig: {e}"))?;

        let display = match (&context, &env.server) {
            (Some(ctx), _) => format!("context {ctx}"),
            (None, Some(server)) => format!("server {server}"),
            (None, None) => format!("cluster {}", config.cluster_url),
        };

        let client = kube::Client::try_from(config)?;
        Ok(Arc::new(KubeClient::new(client, display)))
    }
}
