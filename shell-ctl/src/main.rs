//! shell-ctl: line-oriented command interpreter
//!
//! Reads one line at a time, splits it on whitespace and hands it to the
//! `shell-exec` dispatcher.

mod cli;
mod logging;
mod runner;

use clap::Parser;
use cli::Cli;
use console::style;
use runner::{ShellConfig, run_shell};

fn main() {
    let cli = Cli::parse();

    logging::init_logger(cli.verbose);

    match run_shell(ShellConfig::from(&cli)) {
        Ok(outcome) if outcome.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logger_runs_twice() {
        logging::init_logger(false);
        logging::init_logger(true);
    }

    #[test]
    fn cli_parses_verbose() {
        let cli = Cli::parse_from(["shell-ctl", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.prompt, "$ ");
    }
}
