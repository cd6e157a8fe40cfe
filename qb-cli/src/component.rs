use std::collections::BTreeSet;

use qb_core::prelude::*;

use crate::context::CommandContext;

#[derive(clap::Subcommand)]
pub enum ComponentSubcommand {
    #[command(about = "list effective components for an environment")]
    List(ListArgs),

    #[command(about = "show component differences between two environments")]
    Diff(DiffArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {
    #[arg(long_help = "environment to list components for")]
    pub env: String,

    #[arg(short = 'O', long, long_help = "list excluded components instead")]
    pub objects_excluded: bool,
}

#[derive(clap::Args)]
pub struct DiffArgs {
    #[arg(long_help = "left environment")]
    pub left: String,

    #[arg(default_value = BASELINE_ENVIRONMENT, long_help = "right environment (defaults to the baseline)")]
    pub right: String,
}

pub async fn cmd(subcommand: &ComponentSubcommand, ctx: &CommandContext) -> EmptyResult {
    match subcommand {
        ComponentSubcommand::List(args) => list(args, ctx),
        ComponentSubcommand::Diff(args) => diff(args, ctx),
    }
}

fn list(args: &ListArgs, ctx: &CommandContext) -> EmptyResult {
    let included: BTreeSet<String> = ctx.app.components_for(&args.env)?.into_iter().collect();
    if args.objects_excluded {
        let all: BTreeSet<String> = ctx.app.components_for(BASELINE_ENVIRONMENT)?.into_iter().collect();
        for name in all.difference(&included) {
            println!("{name}");
        }
    } else {
        for name in &included {
            println!("{name}");
        }
    }
    Ok(())
}

fn diff(args: &DiffArgs, ctx: &CommandContext) -> EmptyResult {
    let left: BTreeSet<String> = ctx.app.components_for(&args.left)?.into_iter().collect();
    let right: BTreeSet<String> = ctx.app.components_for(&args.right)?.into_iter().collect();

    for name in left.union(&right) {
        match (left.contains(name), right.contains(name)) {
            (true, false) => println!("-{name} (only in {})", args.left),
            (false, true) => println!("+{name} (only in {})", args.right),
            _ => (),
        }
    }
    Ok(())
}
