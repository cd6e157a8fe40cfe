mod app;
mod apply;
mod completions;
mod component;
mod context;
mod delete;
mod diff;
mod env;
mod eval;
mod evaluator;
mod init;
mod options;
mod output;
mod param;
mod show;
mod validate;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

use clap::{
    CommandFactory,
    Parser,
    Subcommand,
    crate_version,
};
use console::style;
use qb_core::constants::*;
use qb_core::errors::*;
use qb_core::logging;
use qb_engine::cleanup;
use tracing::*;

use crate::app::App;
use crate::component::ComponentSubcommand;
use crate::context::CommandContext;
use crate::env::EnvSubcommand;
use crate::param::ParamSubcommand;

#[derive(Parser)]
#[command(
    about = "declarative configuration for Kubernetes clusters",
    version,
    propagate_version = true
)]
struct QbecCommandRoot {
    #[command(subcommand)]
    subcommand: QbecSubcommand,

    #[arg(long, global = true, env = ROOT_ENV_VAR, default_value = ".", help = "app root directory")]
    root: PathBuf,

    #[arg(long, global = true, help = "tag this invocation to partition deploys of the same app")]
    app_tag: Option<String>,

    #[arg(long, global = true, env = YES_ENV_VAR, help = "assume yes for confirmation prompts")]
    yes: bool,

    #[arg(long, global = true, help = "force colored output on or off")]
    colors: Option<bool>,

    #[arg(short, long, global = true, default_value = "info", help = "log filter for stderr diagnostics")]
    verbosity: String,

    #[arg(long, global = true, env = FORCE_CONTEXT_ENV_VAR, help = "override the kubernetes context")]
    force_k8s_context: Option<String>,

    #[arg(long, global = true, env = FORCE_NAMESPACE_ENV_VAR, help = "override the default namespace")]
    force_k8s_namespace: Option<String>,
}

#[derive(Subcommand)]
enum QbecSubcommand {
    #[command(about = "apply local objects to a cluster environment")]
    Apply(apply::Args),

    #[command(about = "generate shell completions for qbec")]
    Completions(completions::Args),

    #[command(subcommand, about = "component lists and differences")]
    Component(ComponentSubcommand),

    #[command(about = "delete objects from a cluster environment", visible_aliases = &["d", "del"])]
    Delete(delete::Args),

    #[command(about = "diff local objects against a cluster environment")]
    Diff(diff::Args),

    #[command(subcommand, about = "environment list and connection values")]
    Env(EnvSubcommand),

    #[command(about = "evaluate a single file and print its JSON rendering")]
    Eval(eval::Args),

    #[command(about = "initialize a new qbec app directory")]
    Init(init::Args),

    #[command(about = "describe universal options and filters")]
    Options,

    #[command(subcommand, about = "parameter lists and differences")]
    Param(ParamSubcommand),

    #[command(about = "render objects for an environment", visible_alias = "s")]
    Show(show::Args),

    #[command(about = "validate rendered objects against a cluster environment", visible_alias = "val")]
    Validate(validate::Args),

    #[command(about = "qbec version")]
    Version,
}

fn command_context(args: &QbecCommandRoot) -> anyhow::Result<CommandContext> {
    let app = App::load(&args.root, args.app_tag.clone())?;
    let colorize = args.colors.unwrap_or_else(console::colors_enabled);
    Ok(CommandContext::new(
        args.root.clone(),
        app,
        args.yes,
        colorize,
        args.force_k8s_context.clone(),
        args.force_k8s_namespace.clone(),
    ))
}

async fn dispatch(args: &QbecCommandRoot) -> EmptyResult {
    // init/completions/options/version work without an app directory; every
    // other command starts from the manifest
    match &args.subcommand {
        QbecSubcommand::Completions(cargs) => return completions::cmd(cargs, QbecCommandRoot::command()),
        QbecSubcommand::Init(cargs) => return init::cmd(cargs),
        QbecSubcommand::Options => return options::cmd(),
        QbecSubcommand::Version => {
            println!("qbec {}", crate_version!());
            return Ok(());
        },
        _ => (),
    }

    let ctx = command_context(args)?;
    match &args.subcommand {
        QbecSubcommand::Apply(cargs) => apply::cmd(cargs, &ctx).await,
        QbecSubcommand::Component(sub) => component::cmd(sub, &ctx).await,
        QbecSubcommand::Delete(cargs) => delete::cmd(cargs, &ctx).await,
        QbecSubcommand::Diff(cargs) => diff::cmd(cargs, &ctx).await,
        QbecSubcommand::Env(sub) => env::cmd(sub, &ctx).await,
        QbecSubcommand::Eval(cargs) => eval::cmd(cargs, &ctx).await,
        QbecSubcommand::Param(sub) => param::cmd(sub, &ctx).await,
        QbecSubcommand::Show(cargs) => show::cmd(cargs, &ctx).await,
        QbecSubcommand::Validate(cargs) => validate::cmd(cargs, &ctx).await,
        _ => unreachable!("handled above"),
    }
}

async fn shutdown_signal() {
    use tokio::signal::unix::{
        SignalKind,
        signal,
    };
    let mut sigterm = signal(SignalKind::terminate()).expect("signal handler installation");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => (),
        _ = sigterm.recv() => (),
    }
}

fn report_error(err: &anyhow::Error, colorize: bool) {
    let prefix = if colorize { style("error:").red().bold().to_string() } else { "error:".to_string() };
    if is_canceled(err) {
        eprintln!("{prefix} canceled");
    } else if is_usage_error(err) {
        // no chain for user mistakes, the message is the whole story
        eprintln!("{prefix} {err}");
    } else {
        eprintln!("{prefix} {err:#}");
    }
}

#[tokio::main]
async fn main() {
    let args = QbecCommandRoot::parse();
    logging::setup_for_cli(&args.verbosity);
    let colorize = args.colors.unwrap_or_else(console::colors_enabled);

    let result = tokio::select! {
        res = dispatch(&args) => {
            if let Err(err) = cleanup::drain() {
                warn!("cleanup error: {err:#}");
            }
            res
        },
        _ = shutdown_signal() => {
            warn!("interrupted, cleaning up");
            // dropping dispatch cancels in-flight work; closers get a
            // bounded window to run
            let _ = tokio::time::timeout(
                Duration::from_secs(CLEANUP_GRACE_SECONDS),
                tokio::task::spawn_blocking(cleanup::drain),
            )
            .await;
            Err(canceled_error().context("interrupted"))
        },
    };

    if let Err(err) = result {
        report_error(&err, colorize);
        std::process::exit(1);
    }
}
