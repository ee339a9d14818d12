use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use serde_json::json;
use swe_algo::{build_dispatcher, Direction, ProcessType};
use swe_cli::cli::OutputFormat;
use swe_core::SolverKind;
use tabwriter::TabWriter;

use crate::commands::util::{load_network, measure_net_positions};

pub fn handle(
    network: &Path,
    direction: Direction,
    step: f64,
    process: ProcessType,
    solver: SolverKind,
    format: OutputFormat,
) -> Result<()> {
    let network = load_network(network)?;
    let initial = measure_net_positions(&network, solver)?;
    let dispatcher = build_dispatcher(process, direction, &initial)?;
    let plan = dispatcher.dispatch(step);
    let targets = dispatcher.targets(step);

    match format {
        OutputFormat::Json => {
            let body = json!({
                "direction": direction,
                "process": process,
                "step": step,
                "initial_net_positions": initial,
                "plan": plan,
                "targets": targets,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Plain => {
            println!("{direction} {process} step {step:.1} MW");
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "ZONE\tINITIAL NP (MW)\tDELTA (MW)")?;
            for (zone, delta) in plan.iter() {
                let np = initial.get(&zone).copied().unwrap_or(0.0);
                writeln!(writer, "{zone}\t{np:.1}\t{delta:.1}")?;
            }
            writeln!(writer)?;
            writeln!(writer, "BORDER\tTARGET (MW)")?;
            for target in [targets.reference, targets.secondary] {
                writeln!(writer, "{}\t{:.1}", target.border, target.target)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
