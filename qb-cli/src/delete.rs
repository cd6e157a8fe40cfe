use std::collections::HashSet;

use qb_core::errors::*;
use qb_core::prelude::*;
use qb_engine::apply::ApplyStats;
use qb_engine::client::RemoteObject;
use qb_engine::delete::delete_objects;
use qb_engine::generate::generate_objects;
use qb_engine::lister::RemoteLister;
use qb_engine::prompt::Prompter;
use tracing::*;

use crate::context::{
    CommandContext,
    FilterArgs,
};
use crate::output::print_stats;

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "environment to delete objects from")]
    pub env: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(short = 'n', long, long_help = "make no changes, just report what would happen")]
    pub dry_run: bool,

    #[arg(long, long_help = "delete locally rendered objects instead of consulting server labels")]
    pub local: bool,
}

pub async fn cmd(args: &Args, ctx: &CommandContext) -> EmptyResult {
    if args.env == BASELINE_ENVIRONMENT {
        return Err(usage_error("cannot delete the baseline environment"));
    }

    let filter = args.filter.to_filter()?;
    let (scope, env) = ctx.env_scope(&args.env)?;
    let client = ctx.cluster_client(&args.env, &env).await?;
    let components = ctx.app.components_for(&args.env)?;
    let evaluator = ctx.evaluator();
    let eval_ctx = ctx.eval_ctx(&args.env)?;

    let r#gen = generate_objects(&components, &evaluator, client.as_ref(), &filter, &scope, &eval_ctx).await?;

    let (candidates, protected) = if args.local {
        // trust the local rendering: delete exactly what it names
        let candidates = r#gen
            .objects
            .iter()
            .filter(|o| o.name().is_some())
            .map(|o| {
                let namespaced = r#gen.scope_of(o.gvk()).unwrap_or(true);
                let mut remote = o.as_dynamic().clone();
                if namespaced && remote.metadata.namespace.is_none() {
                    remote.metadata.namespace = Some(scope.default_namespace.clone());
                }
                RemoteObject { gvk: o.gvk().clone(), namespaced, obj: remote }
            })
            .collect();
        (candidates, HashSet::new())
    } else {
        let mut lister = RemoteLister::start(client.clone(), &r#gen, &scope);
        let candidates = lister.owned(&r#gen, &filter).await?;
        let protected = lister.protected_namespaces().await?;
        (candidates, protected)
    };

    let mut stats = ApplyStats::default();
    if candidates.is_empty() {
        warn!("no objects to delete");
        print_stats(&stats)?;
        return Ok(());
    }

    let res = async {
        if !args.dry_run {
            ctx.prompter().confirm(&format!(
                "will delete {} object(s) from {}",
                candidates.len(),
                client.display_name()
            ))?;
        }
        delete_objects(client.clone(), candidates, &protected, args.dry_run, &mut stats).await
    }
    .await;

    print_stats(&stats)?;
    res
}
