use std::path::Path;

use anyhow::{Context, Result};
use swe_algo::{
    replace_equivalent_model_by_hvdc, replace_hvdc_by_equivalent_model, HvdcCreationParametersSet,
};
use swe_cli::cli::HvdcCommands;
use tracing::info;

use crate::commands::util::{load_network, write_network};

pub fn handle(command: &HvdcCommands) -> Result<()> {
    match command {
        HvdcCommands::ToHvdc {
            network,
            params,
            out,
        } => {
            let params = load_params(params)?;
            let mut network = load_network(network)?;
            replace_equivalent_model_by_hvdc(network.grid_mut(), &params)
                .context("replacing equivalent models by HVDC links")?;
            write_network(&network, out)?;
            report("Created", &params, out);
        }
        HvdcCommands::ToEquivalent {
            network,
            params,
            out,
        } => {
            let params = load_params(params)?;
            let mut network = load_network(network)?;
            replace_hvdc_by_equivalent_model(network.grid_mut(), &params)
                .context("replacing HVDC links by equivalent models")?;
            write_network(&network, out)?;
            report("Replaced", &params, out);
        }
    }
    Ok(())
}

fn load_params(path: &Path) -> Result<HvdcCreationParametersSet> {
    HvdcCreationParametersSet::load(path)
        .with_context(|| format!("loading HVDC parameters '{}'", path.display()))
}

fn report(verb: &str, params: &HvdcCreationParametersSet, out: &Path) {
    let ids: Vec<String> = params.sorted().iter().map(|p| p.id.to_string()).collect();
    info!(links = ids.len(), out = %out.display(), "HVDC rewrite done");
    println!("{verb} {} HVDC link(s): {}", ids.len(), ids.join(", "));
    println!("Wrote {}", out.display());
}
