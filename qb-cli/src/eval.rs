use std::path::PathBuf;

use qb_core::prelude::*;
use qb_engine::eval::{
    EvalContext,
    Evaluator,
};
use serde_json as json;

use crate::context::CommandContext;

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "file to evaluate")]
    pub file: PathBuf,

    #[arg(short = 'e', long, long_help = "environment whose parameters the evaluation sees")]
    pub env: Option<String>,
}

pub async fn cmd(args: &Args, ctx: &CommandContext) -> EmptyResult {
    let eval_ctx = match &args.env {
        Some(env) => ctx.eval_ctx(env)?,
        None => EvalContext {
            environment: BASELINE_ENVIRONMENT.into(),
            default_namespace: "default".into(),
            properties: json::Value::Null,
        },
    };

    let evaluator = ctx.evaluator();
    let rendered = evaluator.eval_file(&args.file, &eval_ctx).await?;
    println!("{rendered}");
    Ok(())
}
