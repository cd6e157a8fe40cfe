use qb_core::prelude::*;
use qb_core::sort;
use qb_engine::generate::generate_objects;

use crate::context::{
    CommandContext,
    FilterArgs,
};
use crate::output::{
    OutputFormat,
    print_objects,
};

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "environment to render objects for")]
    pub env: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(short = 'o', long = "format", default_value = "yaml")]
    pub format: OutputFormat,

    #[arg(long, long_help = "sort objects in apply order instead of by component")]
    pub sort_apply: bool,

    #[arg(long, long_help = "do not hide secret values in the output")]
    pub show_secrets: bool,
}

pub async fn cmd(args: &Args, ctx: &CommandContext) -> EmptyResult {
    let filter = args.filter.to_filter()?;
    let (scope, env) = ctx.env_scope(&args.env)?;
    let client = ctx.cluster_client(&args.env, &env).await?;
    let components = ctx.app.components_for(&args.env)?;
    let evaluator = ctx.evaluator();
    let eval_ctx = ctx.eval_ctx(&args.env)?;

    let r#gen = generate_objects(&components, &evaluator, client.as_ref(), &filter, &scope, &eval_ctx).await?;

    let mut objects = r#gen.objects.clone();
    if args.sort_apply {
        sort::sort_for_apply(&mut objects, &r#gen.scopes);
    } else {
        objects.sort_by_cached_key(|o| {
            (o.component.clone(), o.kind().to_string(), o.name().unwrap_or_default().to_string())
        });
    }

    print_objects(&objects, args.format, args.show_secrets)
}
