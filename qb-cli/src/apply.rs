use std::time::Duration;

use qb_core::errors::*;
use qb_core::prelude::*;
use qb_engine::apply::{
    ApplyOptions,
    ApplyStats,
};

use crate::context::{
    CommandContext,
    FilterArgs,
};
use crate::output::print_stats;

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "environment to apply objects to")]
    pub env: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(short = 'n', long, long_help = "make no changes, just report what would happen")]
    pub dry_run: bool,

    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        long_help = "garbage collect extra objects on the server (--gc=false to disable)"
    )]
    pub gc: bool,

    #[arg(long, long_help = "wait for created and updated objects to roll out")]
    pub wait: bool,

    #[arg(long, long_help = "wait for every applied object, changed or not")]
    pub wait_all: bool,

    #[arg(long, default_value = "5m", long_help = "how long to wait for rollouts before giving up")]
    pub wait_timeout: String,

    #[arg(long, default_value_t = 1, long_help = "number of parallel sync operations")]
    pub parallel: usize,
}

pub async fn cmd(args: &Args, ctx: &CommandContext) -> EmptyResult {
    let wait_timeout: Duration = humantime::parse_duration(&args.wait_timeout)
        .map_err(|e| usage_error(format!("invalid --wait-timeout {:?}: {e}", args.wait_timeout)))?;

    let filter = args.filter.to_filter()?;
    let (scope, env) = ctx.env_scope(&args.env)?;
    let client = ctx.cluster_client(&args.env, &env).await?;
    let components = ctx.app.components_for(&args.env)?;
    let evaluator = ctx.evaluator();
    let eval_ctx = ctx.eval_ctx(&args.env)?;
    let prompter = ctx.prompter();

    let opts = ApplyOptions {
        dry_run: args.dry_run,
        gc: args.gc,
        wait: args.wait,
        wait_all: args.wait_all,
        wait_timeout,
        parallelism: args.parallel,
    };

    let mut stats = ApplyStats::default();
    let res = qb_engine::apply::run(
        client,
        &evaluator,
        &components,
        &filter,
        &scope,
        &eval_ctx,
        &prompter,
        &opts,
        &mut stats,
    )
    .await;

    // partial progress is still reported when a stage failed
    print_stats(&stats)?;
    res
}
