use anyhow::Result;
use clap::Parser;
use reckon::cli::{Command, RootArgs};
use reckon::workflow;
use tracing_subscriber::EnvFilter;

/// Filter directives read from the environment, e.g. `RECKON_LOG=reckon=debug`.
const LOG_ENV: &str = "RECKON_LOG";

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Version(args) => workflow::run_version(args),
        Command::Inventory(args) => workflow::run_inventory(args),
        Command::Init(args) => workflow::run_init(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
