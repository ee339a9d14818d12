use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;
use swe_algo::{Direction, ProcessType};
use swe_core::SolverKind;

#[derive(Parser, Debug)]
#[command(name = "swe-cli", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure border exchanges and net positions with a DC load flow
    Exchanges {
        /// Network document (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        network: PathBuf,
        /// Linear solver for the DC load flow
        #[arg(long, default_value = "gauss")]
        solver: SolverKind,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Print the zonal plan and border targets of a step without shifting
    Dispatch {
        #[arg(value_hint = ValueHint::FilePath)]
        network: PathBuf,
        /// ES_FR, FR_ES, ES_PT or PT_ES
        #[arg(long)]
        direction: Direction,
        /// Step (MW)
        #[arg(long)]
        step: f64,
        #[arg(long, default_value = "d2cc")]
        process: ProcessType,
        #[arg(long, default_value = "gauss")]
        solver: SolverKind,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Shift a network to a step and write the result
    Shift {
        #[arg(value_hint = ValueHint::FilePath)]
        network: PathBuf,
        #[arg(long)]
        direction: Direction,
        /// Step (MW)
        #[arg(long)]
        step: f64,
        /// Zonal scalable catalog (JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        glsk: PathBuf,
        /// Run configuration (TOML); flags below override it
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        #[arg(long)]
        process: Option<ProcessType>,
        #[arg(long)]
        solver: Option<SolverKind>,
        /// Override the shifting iteration bound
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Output network document
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// Rewrite between HVDC links and their AC-equivalent models
    Hvdc {
        #[command(subcommand)]
        command: HvdcCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HvdcCommands {
    /// Replace equivalent generator/load pairs by HVDC links
    ToHvdc {
        #[arg(value_hint = ValueHint::FilePath)]
        network: PathBuf,
        /// HVDC creation parameters (JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        params: PathBuf,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// Replace HVDC links by their AC-equivalent models
    ToEquivalent {
        #[arg(value_hint = ValueHint::FilePath)]
        network: PathBuf,
        #[arg(long, value_hint = ValueHint::FilePath)]
        params: PathBuf,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
