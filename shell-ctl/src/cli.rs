use clap::Parser;

#[derive(Parser)]
#[command(name = "shell-ctl")]
#[command(version, about = "A small line-oriented command interpreter", long_about = None)]
#[command(after_help = "SUPPORTED LINES:
    cmd args...             run in the foreground
    cmd args... &           run in the background
    cmd args... | cmd args  two-stage pipeline
    cmd args... > file      write standard output to file

EXAMPLES:
    shell-ctl
    shell-ctl --prompt '> '
    shell-ctl -c 'ls -l | wc -l'
    echo 'echo hi > /tmp/out' | shell-ctl --no-prompt
")]
pub struct Cli {
    /// Run a single line and exit
    #[arg(short = 'c', long, value_name = "LINE")]
    pub command: Option<String>,

    /// Prompt printed before each line
    #[arg(short, long, value_name = "TEXT", default_value = "$ ")]
    pub prompt: String,

    /// Do not print a prompt
    #[arg(long)]
    pub no_prompt: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
