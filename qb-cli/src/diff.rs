use qb_core::prelude::*;
use qb_engine::diff::{
    DiffOptions,
    DiffStats,
};

use crate::context::{
    CommandContext,
    FilterArgs,
};
use crate::output::print_stats;

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "environment to diff objects against")]
    pub env: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(long, long_help = "exit non-zero when any differences are found")]
    pub error_exit: bool,

    #[arg(
        long = "show-deletes",
        default_value_t = true,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        long_help = "also diff server objects that would be garbage collected"
    )]
    pub show_deletes: bool,

    #[arg(long, long_help = "do not hide secret values in diff output")]
    pub show_secrets: bool,

    #[arg(long, default_value_t = 3, long_help = "context lines in diff output")]
    pub context_lines: usize,

    #[arg(long, default_value_t = 5, long_help = "number of parallel comparisons")]
    pub parallel: usize,

    #[arg(long, long_help = "ignore all labels when comparing")]
    pub ignore_all_labels: bool,

    #[arg(long = "ignore-label", long_help = "ignore a specific label when comparing")]
    pub ignore_labels: Vec<String>,

    #[arg(long, long_help = "ignore all annotations when comparing")]
    pub ignore_all_annotations: bool,

    #[arg(long = "ignore-annotation", long_help = "ignore a specific annotation when comparing")]
    pub ignore_annotations: Vec<String>,
}

pub async fn cmd(args: &Args, ctx: &CommandContext) -> EmptyResult {
    let filter = args.filter.to_filter()?;
    let (scope, env) = ctx.env_scope(&args.env)?;
    let client = ctx.cluster_client(&args.env, &env).await?;
    let components = ctx.app.components_for(&args.env)?;
    let evaluator = ctx.evaluator();
    let eval_ctx = ctx.eval_ctx(&args.env)?;

    let opts = DiffOptions {
        context_lines: args.context_lines,
        show_deletions: args.show_deletes,
        show_secrets: args.show_secrets,
        error_exit: args.error_exit,
        parallelism: args.parallel,
        colorize: ctx.colorize,
        ignore_all_labels: args.ignore_all_labels,
        ignore_labels: args.ignore_labels.clone(),
        ignore_all_annotations: args.ignore_all_annotations,
        ignore_annotations: args.ignore_annotations.clone(),
    };

    let mut stats = DiffStats::default();
    let res = qb_engine::diff::run(
        client,
        &evaluator,
        &components,
        &filter,
        &scope,
        &eval_ctx,
        &opts,
        &mut stats,
    )
    .await;

    print_stats(&stats)?;
    res
}
