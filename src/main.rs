//! Music Ledger - track and rate a shared music catalog from the terminal.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use music_ledger::{cli, config, error::Error};

fn main() -> anyhow::Result<ExitCode> {
    let args = cli::Cli::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive("music_ledger=info".parse()?)
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = config::load();
    match cli::run_command(&args, config) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Rejected input is the user's to fix; report it without a trace.
        Err(e) if e.downcast_ref::<Error>().is_some_and(Error::is_validation) => {
            eprintln!("Rejected: {e:#}");
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e),
    }
}
