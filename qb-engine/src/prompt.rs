use std::collections::VecDeque;
use std::io::{
    BufRead,
    IsTerminal,
    Write,
};
use std::sync::Mutex;

use qb_core::errors::*;
use tracing::*;

// Confirmation sits behind a trait so tests can script answers and --yes can
// short-circuit without touching stdin.
pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str) -> EmptyResult;
}

pub struct StdinPrompter {
    pub auto_yes: bool,
}

impl Prompter for StdinPrompter {
    fn confirm(&self, message: &str) -> EmptyResult {
        if self.auto_yes {
            info!("{message} (auto-confirmed)");
            return Ok(());
        }
        if !std::io::stdin().is_terminal() {
            bail!("{message}: specify --yes to confirm in a non-interactive session");
        }
        eprintln!("{message}");
        confirm_from(&mut std::io::stdin().lock())
    }
}

fn confirm_from(input: &mut impl BufRead) -> EmptyResult {
    loop {
        eprint!("Do you want to continue [y/n]: ");
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(canceled_error());
        }
        match line.trim() {
            "y" | "Y" | "yes" => return Ok(()),
            "n" | "N" | "no" => return Err(canceled_error()),
            _ => eprintln!("please answer y or n"),
        }
    }
}

// Pre-seeded answers for tests; popping past the end means the test forgot
// to script an answer, which should fail loudly.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> ScriptedPrompter {
        ScriptedPrompter {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str) -> EmptyResult {
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("unscripted prompt: {message}"))?;
        if answer { Ok(()) } else { Err(canceled_error()) }
    }
}
