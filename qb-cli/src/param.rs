use std::collections::BTreeMap;

use qb_core::prelude::*;
use serde_json as json;

use crate::context::CommandContext;
use crate::output::{
    OutputFormat,
    print_doc,
};

#[derive(clap::Subcommand)]
pub enum ParamSubcommand {
    #[command(about = "list effective parameter values for an environment")]
    List(ListArgs),

    #[command(about = "show parameter differences between two environments")]
    Diff(DiffArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {
    #[arg(long_help = "environment to list parameters for")]
    pub env: String,

    #[arg(short = 'o', long = "format")]
    pub format: Option<OutputFormat>,
}

#[derive(clap::Args)]
pub struct DiffArgs {
    #[arg(long_help = "left environment")]
    pub left: String,

    #[arg(default_value = BASELINE_ENVIRONMENT, long_help = "right environment (defaults to the baseline)")]
    pub right: String,
}

pub async fn cmd(subcommand: &ParamSubcommand, ctx: &CommandContext) -> EmptyResult {
    match subcommand {
        ParamSubcommand::List(args) => list(args, ctx),
        ParamSubcommand::Diff(args) => diff(args, ctx),
    }
}

// nested properties print as dotted paths so they're flat, greppable lines
fn flatten_into(prefix: &str, value: &json::Value, out: &mut BTreeMap<String, String>) {
    match value {
        json::Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() { k.clone() } else { format!("{prefix}.{k}") };
                flatten_into(&key, v, out);
            }
        },
        json::Value::Null => (),
        other => {
            out.insert(prefix.to_string(), other.to_string());
        },
    }
}

fn list(args: &ListArgs, ctx: &CommandContext) -> EmptyResult {
    let props = ctx.app.properties_for(&args.env)?;
    match args.format {
        None => {
            let mut flat = BTreeMap::new();
            flatten_into("", &props, &mut flat);
            for (k, v) in flat {
                println!("{k}={v}");
            }
        },
        Some(format) => print_doc(&props, format)?,
    }
    Ok(())
}

fn diff(args: &DiffArgs, ctx: &CommandContext) -> EmptyResult {
    let mut left = BTreeMap::new();
    flatten_into("", &ctx.app.properties_for(&args.left)?, &mut left);
    let mut right = BTreeMap::new();
    flatten_into("", &ctx.app.properties_for(&args.right)?, &mut right);

    for key in left.keys().chain(right.keys()).collect::<std::collections::BTreeSet<_>>() {
        match (left.get(key), right.get(key)) {
            (Some(l), Some(r)) if l != r => println!("~{key}: {l} -> {r}"),
            (Some(l), None) => println!("-{key}: {l}"),
            (None, Some(r)) => println!("+{key}: {r}"),
            _ => (),
        }
    }
    Ok(())
}
