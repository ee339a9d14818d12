use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use swe_algo::{DcExchangeMeasurement, ExchangeMeasurement};
use swe_cli::cli::OutputFormat;
use swe_core::SolverKind;
use tabwriter::TabWriter;
use tracing::info;

use crate::commands::util::load_network;

pub fn handle(network: &Path, solver: SolverKind, format: OutputFormat) -> Result<()> {
    let network = load_network(network)?;
    info!(network = network.id(), solver = solver.as_str(), "measuring border exchanges");
    let exchanges = DcExchangeMeasurement::with_kind(solver)
        .compute_exchanges(network.grid())
        .context("computing border exchanges")?;
    let positions = exchanges.net_positions();

    match format {
        OutputFormat::Json => {
            let body = json!({
                "network": network.id(),
                "exchanges": exchanges,
                "net_positions": positions,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Plain => {
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "BORDER\tEXCHANGE (MW)")?;
            for (border, mw) in exchanges.iter() {
                writeln!(writer, "{border}\t{mw:.1}")?;
            }
            writeln!(writer)?;
            writeln!(writer, "ZONE\tNET POSITION (MW)")?;
            for (zone, mw) in &positions {
                writeln!(writer, "{zone}\t{mw:.1}")?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
