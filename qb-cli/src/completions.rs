use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use clap::value_parser;
use clap_complete::{
    Shell,
    generate,
};
use qb_core::errors::*;

#[derive(clap::Args)]
pub struct Args {
    #[arg(
        long_help = "name of the shell to generate completion files for",
        value_parser = value_parser!(clap_complete::Shell),
    )]
    pub shell: Shell,

    #[arg(short = 'o', long = "stdout", long_help = "print to stdout instead of installing")]
    pub stdout: bool,
}

fn default_path_for(shell: &Shell) -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or(PathBuf::from("."));
    match shell {
        Shell::Bash => path.push("bash-completion"),
        Shell::Elvish => path.push("elvish/lib"),
        Shell::Fish => path.push("fish/vendor_completions.d"),
        Shell::Zsh => path.push("zsh/site-functions"),
        _ => (),
    };
    path.push(completion_filename_for(shell));
    path
}

fn completion_filename_for(shell: &Shell) -> &'static str {
    match shell {
        Shell::Bash => "qbec",
        Shell::Elvish => "qbec.elv",
        Shell::Fish => "qbec.fish",
        Shell::Zsh => "_qbec",
        _ => "_qbec",
    }
}

pub fn cmd(args: &Args, mut cmd: clap::Command) -> EmptyResult {
    let (mut out, maybe_path): (Box<dyn Write>, Option<PathBuf>) = if args.stdout {
        (Box::new(io::stdout()), None)
    } else {
        let path = default_path_for(&args.shell);
        let parent = path.parent().ok_or_else(|| anyhow!("no parent directory for {}", path.display()))?;
        fs::create_dir_all(parent)?;
        (Box::new(File::create(&path)?), Some(path))
    };

    generate(args.shell, &mut cmd, "qbec", &mut out);

    if let Some(path) = maybe_path {
        println!("completions written to {}", path.to_string_lossy());
        if args.shell == Shell::Zsh {
            println!("you may need to add {} to $fpath in your .zshrc", path.parent().unwrap().to_string_lossy());
        }
        println!("restart your shell to pick them up");
    }

    Ok(())
}
