use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod dispatch;
mod fixtures;
mod launch;
mod progress;
mod render;
mod session;
mod util;
mod wizard;
mod workflow;

use cli::{Command, RootArgs};

/// Log filter directives, e.g. `INTEL_LOG=info` or `INTEL_LOG=ilaunch=debug`.
const LOG_ENV: &str = "INTEL_LOG";

fn main() -> Result<()> {
    init_tracing();
    let args = RootArgs::parse();

    match args.command {
        Command::Init(args) => workflow::run_init(args),
        Command::Overview(args) => workflow::run_overview(args),
        Command::Competitors(args) => workflow::run_competitors(args),
        Command::Analyses(args) => workflow::run_analyses(args),
        Command::Wizard(args) => workflow::run_wizard(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
