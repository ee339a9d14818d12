use clap::Parser;
use std::io;
use std::process::ExitCode;
use swe_cli::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

use crate::commands::{completions, dispatch, exchanges, hvdc, shift};

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Exchanges {
            network,
            solver,
            format,
        } => exchanges::handle(network, *solver, *format),
        Commands::Dispatch {
            network,
            direction,
            step,
            process,
            solver,
            format,
        } => dispatch::handle(network, *direction, *step, *process, *solver, *format),
        command @ Commands::Shift { .. } => shift::handle(command),
        Commands::Hvdc { command } => hvdc::handle(command),
        Commands::Completions { shell, out } => completions::handle(*shell, out.as_deref()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {err}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
