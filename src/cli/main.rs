//! `convconf` command-line interface

mod args;
mod commands;
mod error;

use clap::Parser;

use args::{Cli, Commands};
use error::CliError;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.verbose) {
        eprintln!("convconf error: {error:#}");
        std::process::exit(1);
    }

    if let Err(error) = run(cli) {
        eprintln!("convconf error: {error:#}");
        let code = error
            .downcast_ref::<CliError>()
            .map(CliError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::CheckLm { km, lm } => commands::check::handle_check(km, lm)?,
        Commands::Plan { models, out } => commands::plan::handle_plan(models, out)?,
        Commands::Convert(args) => commands::convert::handle_convert(args)?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;
    Ok(())
}
