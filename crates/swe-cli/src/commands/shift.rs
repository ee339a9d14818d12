use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use swe_algo::{
    build_dispatcher, DcExchangeMeasurement, NetworkShifter, NetworkShifting,
    ZonalScalableCatalog,
};
use swe_batch::SweConfig;
use swe_cli::cli::Commands;
use tabwriter::TabWriter;
use tracing::info;

use crate::commands::util::{load_network, measure_net_positions, write_network};

pub fn handle(command: &Commands) -> Result<()> {
    let Commands::Shift {
        network,
        direction,
        step,
        glsk,
        config,
        process,
        solver,
        max_iterations,
        out,
    } = command
    else {
        return Err(anyhow!("shift handler called with another command"));
    };

    let mut config = match config {
        Some(path) => SweConfig::load(path)?,
        None => SweConfig::default(),
    };
    if let Some(process) = process {
        config.process = *process;
    }
    if let Some(solver) = solver {
        config.solver = *solver;
    }
    if let Some(max_iterations) = max_iterations {
        config.shifting.max_iterations = *max_iterations;
    }

    let catalog = ZonalScalableCatalog::load(glsk)
        .with_context(|| format!("loading scalable catalog '{}'", glsk.display()))?;
    let mut network = load_network(network)?;
    let initial = measure_net_positions(&network, config.solver)?;
    let dispatcher = build_dispatcher(config.process, *direction, &initial)?;
    let shifter = NetworkShifter::new(
        dispatcher,
        Arc::new(catalog),
        Arc::new(DcExchangeMeasurement::with_kind(config.solver)),
        config.shifting.clone(),
    );

    info!(%direction, step, process = %config.process, "shifting network");
    let started = Instant::now();
    let outcome = shifter
        .shift(*step, &mut network)
        .with_context(|| format!("shifting {direction} to {step} MW"))?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    write_network(&network, out)?;

    println!(
        "Shifted {direction} to {step:.1} MW in {} iteration(s) ({elapsed_ms:.1} ms)",
        outcome.iterations
    );
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "ZONE\tREQUESTED (MW)\tREALIZED (MW)")?;
    for scaling in &outcome.scalings {
        writeln!(
            writer,
            "{}\t{:.1}\t{:.1}",
            scaling.zone, scaling.requested, scaling.realized
        )?;
    }
    writer.flush()?;
    println!("Exchanges: {}", outcome.exchanges);
    println!("Wrote {}", out.display());
    Ok(())
}
