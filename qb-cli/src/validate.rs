use console::style;
use qb_core::errors::*;
use qb_core::prelude::*;
use qb_engine::generate::generate_objects;

use crate::context::{
    CommandContext,
    FilterArgs,
};

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "environment to validate objects against")]
    pub env: String,

    #[command(flatten)]
    pub filter: FilterArgs,
}

// Validation is what the generator already enforces (complete metadata,
// unique identities) plus a server check that every kind actually exists on
// the target cluster.
pub async fn cmd(args: &Args, ctx: &CommandContext) -> EmptyResult {
    let filter = args.filter.to_filter()?;
    let (scope, env) = ctx.env_scope(&args.env)?;
    let client = ctx.cluster_client(&args.env, &env).await?;
    let components = ctx.app.components_for(&args.env)?;
    let evaluator = ctx.evaluator();
    let eval_ctx = ctx.eval_ctx(&args.env)?;

    let r#gen = generate_objects(&components, &evaluator, client.as_ref(), &filter, &scope, &eval_ctx).await?;

    let mut failures = vec![];
    for obj in &r#gen.objects {
        let display = obj.display_name();
        match r#gen.scopes.get(obj.gvk()).copied().flatten() {
            Some(_) => {
                let check = if ctx.colorize { style("✔").green().to_string() } else { "ok:".to_string() };
                println!("{check} {display}");
            },
            None => {
                let cross = if ctx.colorize { style("✘").red().to_string() } else { "error:".to_string() };
                println!("{cross} {display}: server does not recognize kind {}", obj.gvk());
                failures.push(display);
            },
        }
    }

    if !failures.is_empty() {
        bail!("{} object(s) failed validation", failures.len());
    }
    println!("{} object(s) validated for environment {}", r#gen.objects.len(), args.env);
    Ok(())
}
