use log::{debug, info};
use shell_exec::{Outcome, Result, dispatch, finalize, initialize};
use std::io::{self, BufRead, Write};

use crate::cli::Cli;

/// Configuration for the read-dispatch loop
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Prompt printed before each line, if any
    pub prompt: Option<String>,
    /// Single line to run instead of reading stdin
    pub command: Option<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: Some("$ ".to_string()),
            command: None,
        }
    }
}

impl From<&Cli> for ShellConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            prompt: (!cli.no_prompt).then(|| cli.prompt.clone()),
            command: cli.command.clone(),
        }
    }
}

/// Split a raw line into tokens. No quoting or escaping is recognized.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Run the interpreter.
///
/// Returns the outcome of the `-c` line, or `Success` once stdin is exhausted.
pub fn run_shell(config: ShellConfig) -> Result<Outcome> {
    initialize()?;

    let outcome = match &config.command {
        Some(line) => {
            debug!("Running single line: {}", line);
            dispatch(&mut tokenize(line))
        }
        None => read_loop(io::stdin().lock(), config.prompt.as_deref())?,
    };

    finalize();
    Ok(outcome)
}

fn read_loop(mut input: impl BufRead, prompt: Option<&str>) -> Result<Outcome> {
    let mut line = String::new();
    let mut processed = 0usize;

    loop {
        if let Some(prompt) = prompt {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", prompt)?;
            stdout.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        // Failures were already reported; keep reading either way.
        let _ = dispatch(&mut tokenize(&line));
        processed += 1;
    }

    if prompt.is_some() {
        println!();
    }
    info!("End of input after {} lines", processed);
    Ok(Outcome::Success)
}
