use console::style;
use env_logger::{Builder, Env};
use log::Level;
use std::io::Write;

/// Initialize logger based on verbose flag
pub fn init_logger(verbose: bool) {
    let env = Env::default().filter_or("RUST_LOG", if verbose { "debug" } else { "warn" });

    let result = Builder::from_env(env)
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => format!("{}", style("error:").red().bold()),
                Level::Warn => format!("{}", style("warn: ").yellow().bold()),
                Level::Info => format!("{}", style("info: ").green()),
                Level::Debug => format!("{}", style("debug:").cyan()),
                Level::Trace => format!("{}", style("trace:").dim()),
            };
            writeln!(buf, "{} {}", level, record.args())
        })
        .try_init();

    // A second init (tests, embedding) keeps the first logger.
    drop(result);
}
