use std::collections::BTreeMap;

use qb_core::prelude::*;

use crate::context::CommandContext;
use crate::output::{
    OutputFormat,
    print_doc,
};

#[derive(clap::Subcommand)]
pub enum EnvSubcommand {
    #[command(about = "list environments defined by the app")]
    List(ListArgs),

    #[command(about = "print cluster connection values for an environment")]
    Vars(VarsArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {
    #[arg(short = 'o', long = "format", long_help = "output full environment definitions in this format")]
    pub format: Option<OutputFormat>,
}

#[derive(clap::Args)]
pub struct VarsArgs {
    #[arg(long_help = "environment to print values for")]
    pub env: String,

    #[arg(short = 'o', long = "format")]
    pub format: Option<OutputFormat>,
}

pub async fn cmd(subcommand: &EnvSubcommand, ctx: &CommandContext) -> EmptyResult {
    match subcommand {
        EnvSubcommand::List(args) => list(args, ctx),
        EnvSubcommand::Vars(args) => vars(args, ctx),
    }
}

fn list(args: &ListArgs, ctx: &CommandContext) -> EmptyResult {
    match args.format {
        None => {
            for name in ctx.app.environment_names() {
                println!("{name}");
            }
        },
        Some(format) => {
            let mut envs = BTreeMap::new();
            for name in ctx.app.environment_names() {
                envs.insert(name.clone(), ctx.app.environment(&name)?);
            }
            print_doc(&envs, format)?;
        },
    }
    Ok(())
}

fn vars(args: &VarsArgs, ctx: &CommandContext) -> EmptyResult {
    let env = ctx.app.environment(&args.env)?;
    let namespace = ctx.resolved_namespace(&env);

    match args.format {
        None => {
            // shell-evalable, in the spirit of `eval $(qbec env vars ...)`
            println!("QBEC_NAMESPACE='{namespace}';");
            if let Some(context) = &env.context {
                println!("QBEC_CONTEXT='{context}';");
            }
            if let Some(server) = &env.server {
                println!("QBEC_SERVER='{server}';");
            }
        },
        Some(format) => {
            let doc = serde_json::json!({
                "namespace": namespace,
                "context": env.context,
                "server": env.server,
            });
            print_doc(&doc, format)?;
        },
    }
    Ok(())
}
