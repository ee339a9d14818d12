use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use swe_algo::{net_positions, DcExchangeMeasurement};
use swe_core::{load_network_json, write_network_json, Network, SolverKind, Zone};

pub fn load_network(path: &Path) -> Result<Network> {
    load_network_json(path).with_context(|| format!("loading network '{}'", path.display()))
}

pub fn write_network(network: &Network, path: &Path) -> Result<()> {
    write_network_json(network, path)
        .with_context(|| format!("writing network '{}'", path.display()))
}

/// Net positions of the working variant, measured with a DC load flow.
pub fn measure_net_positions(network: &Network, solver: SolverKind) -> Result<BTreeMap<Zone, f64>> {
    let measurement = DcExchangeMeasurement::with_kind(solver);
    net_positions(network.grid(), &measurement).context("measuring initial net positions")
}
