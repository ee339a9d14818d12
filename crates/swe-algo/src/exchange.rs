//! Border exchange measurement.
//!
//! Exchanges are read from a DC load flow (B′θ = P) over the main
//! synchronous component. The slack is the first ES bus by id, so any
//! generation/load imbalance is absorbed on the Spanish side and foreign
//! net positions equal their scheduled injections. HVDC lines transfer
//! their setpoint: the rectifier bus withdraws it, the inverter bus
//! injects it, and the setpoint counts directly toward the border.

use crate::error::ShiftResult;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use swe_core::{
    main_component_buses, BranchId, BusId, Edge, Grid, LinearSystemBackend, SolverKind, Zone,
};

/// Directed border between two zones. Positive exchange means export from
/// `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Border {
    pub from: Zone,
    pub to: Zone,
}

impl Border {
    pub const ES_FR: Border = Border::new(Zone::Es, Zone::Fr);
    pub const ES_PT: Border = Border::new(Zone::Es, Zone::Pt);

    pub const fn new(from: Zone, to: Zone) -> Self {
        Self { from, to }
    }

    pub fn reversed(self) -> Self {
        Self::new(self.to, self.from)
    }

    /// Storage orientation: ES first when ES is involved, otherwise zone order.
    fn canonical(self) -> (Border, f64) {
        let swap = if self.to == Zone::Es {
            true
        } else if self.from == Zone::Es {
            false
        } else {
            self.from > self.to
        };
        if swap {
            (self.reversed(), -1.0)
        } else {
            (self, 1.0)
        }
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Measured exchanges on every border crossed by a closed AC branch or an
/// HVDC link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorderExchanges {
    flows: BTreeMap<Border, f64>,
}

impl BorderExchanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `mw` flowing across `border`.
    pub fn record(&mut self, border: Border, mw: f64) {
        if border.from == border.to {
            return;
        }
        let (key, sign) = border.canonical();
        *self.flows.entry(key).or_insert(0.0) += sign * mw;
    }

    /// Exchange from `border.from` to `border.to` (MW); zero when the zones
    /// share no connection.
    pub fn exchange(&self, border: Border) -> f64 {
        let (key, sign) = border.canonical();
        self.flows.get(&key).map_or(0.0, |mw| sign * mw)
    }

    /// Net export of `zone` to all other zones.
    pub fn net_position(&self, zone: Zone) -> f64 {
        Zone::ALL
            .into_iter()
            .filter(|other| *other != zone)
            .map(|other| self.exchange(Border::new(zone, other)))
            .sum()
    }

    pub fn net_positions(&self) -> BTreeMap<Zone, f64> {
        Zone::ALL
            .into_iter()
            .map(|zone| (zone, self.net_position(zone)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Border, f64)> + '_ {
        self.flows.iter().map(|(border, mw)| (*border, *mw))
    }
}

impl fmt::Display for BorderExchanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flows.is_empty() {
            return f.write_str("none");
        }
        let parts: Vec<String> = self
            .iter()
            .map(|(border, mw)| format!("{border}={mw:.1} MW"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl Serialize for BorderExchanges {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.flows.len()))?;
        for (border, mw) in self.iter() {
            map.serialize_entry(&border.to_string(), &mw)?;
        }
        map.end()
    }
}

/// Result of one DC load flow.
#[derive(Debug, Clone, Default)]
pub struct DcFlow {
    pub slack: Option<BusId>,
    /// Angles in radians, main component only.
    pub angles: HashMap<BusId, f64>,
    /// From-to active flow of every closed AC branch in the main component.
    pub flows: BTreeMap<BranchId, f64>,
    /// Injection balance picked up by the slack bus (MW).
    pub slack_mw: f64,
}

/// Signed injection per bus of the main component (MW).
fn bus_injections(grid: &Grid, main: &HashSet<BusId>) -> HashMap<BusId, f64> {
    let mut injections: HashMap<BusId, f64> = HashMap::new();
    for gen in grid.generators() {
        if gen.connected && main.contains(&gen.bus) {
            *injections.entry(gen.bus.clone()).or_insert(0.0) += gen.target_p.value();
        }
    }
    for load in grid.loads() {
        if load.connected && main.contains(&load.bus) {
            *injections.entry(load.bus.clone()).or_insert(0.0) -= load.p0.value();
        }
    }
    for (bus1, bus2, mw) in active_hvdc_transfers(grid) {
        if main.contains(&bus1) {
            *injections.entry(bus1).or_insert(0.0) -= mw;
        }
        if main.contains(&bus2) {
            *injections.entry(bus2).or_insert(0.0) += mw;
        }
    }
    injections
}

/// (side-1 bus, side-2 bus, side-1-to-side-2 MW) of HVDC lines whose two
/// converter stations are connected.
fn active_hvdc_transfers(grid: &Grid) -> Vec<(BusId, BusId, f64)> {
    grid.hvdc_lines()
        .into_iter()
        .filter_map(|line| {
            let c1 = grid.converter(&line.converter1)?;
            let c2 = grid.converter(&line.converter2)?;
            (c1.connected && c2.connected).then(|| {
                (
                    c1.bus.clone(),
                    c2.bus.clone(),
                    line.flow_side1_to_side2().value(),
                )
            })
        })
        .collect()
}

/// Effective series reactance of a closed AC edge.
fn closed_ac_reactance(edge: &Edge) -> Option<(&BranchId, &BusId, &BusId, f64)> {
    match edge {
        Edge::Branch(b) if b.is_connected() => {
            Some((&b.id, &b.from_bus, &b.to_bus, b.reactance.abs().max(1e-6)))
        }
        Edge::Transformer(t) if t.is_connected() => Some((
            &t.id,
            &t.from_bus,
            &t.to_bus,
            (t.reactance * t.ratio).abs().max(1e-6),
        )),
        _ => None,
    }
}

/// Run a DC load flow on the main synchronous component of `grid`.
pub fn dc_load_flow(grid: &Grid, solver: &dyn LinearSystemBackend) -> ShiftResult<DcFlow> {
    let main = main_component_buses(grid);
    let mut bus_ids: Vec<BusId> = main.iter().cloned().collect();
    bus_ids.sort();
    if let Some(pos) = bus_ids
        .iter()
        .position(|id| grid.zone_of(id) == Some(Zone::Es))
    {
        let slack = bus_ids.remove(pos);
        bus_ids.insert(0, slack);
    }
    let Some(slack) = bus_ids.first().cloned() else {
        return Ok(DcFlow::default());
    };

    let index: HashMap<&BusId, usize> = bus_ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
    let n = bus_ids.len();
    let mut susceptance = vec![vec![0.0; n]; n];
    for edge in grid.graph.edge_weights() {
        let Some((_, from, to, x)) = closed_ac_reactance(edge) else {
            continue;
        };
        if let (Some(&i), Some(&j)) = (index.get(from), index.get(to)) {
            let b = 1.0 / x;
            susceptance[i][j] -= b;
            susceptance[j][i] -= b;
            susceptance[i][i] += b;
            susceptance[j][j] += b;
        }
    }

    let injections = bus_injections(grid, &main);
    let rhs: Vec<f64> = bus_ids
        .iter()
        .map(|id| injections.get(id).copied().unwrap_or(0.0))
        .collect();

    let mut angles = HashMap::with_capacity(n);
    angles.insert(slack.clone(), 0.0);
    if n > 1 {
        // Drop the slack row/column so B′ becomes non-singular.
        let reduced: Vec<Vec<f64>> = susceptance[1..].iter().map(|row| row[1..].to_vec()).collect();
        let solution = solver.solve(&reduced, &rhs[1..])?;
        for (id, theta) in bus_ids.iter().skip(1).zip(solution) {
            angles.insert(id.clone(), theta);
        }
    }

    let mut flows = BTreeMap::new();
    for edge in grid.graph.edge_weights() {
        let Some((id, from, to, x)) = closed_ac_reactance(edge) else {
            continue;
        };
        if let (Some(theta_from), Some(theta_to)) = (angles.get(from), angles.get(to)) {
            flows.insert(id.clone(), (theta_from - theta_to) / x);
        }
    }

    Ok(DcFlow {
        slack: Some(slack),
        angles,
        flows,
        slack_mw: -rhs.iter().sum::<f64>(),
    })
}

/// Border exchanges of `grid` from a DC load flow plus HVDC setpoints.
pub fn compute_exchanges(
    grid: &Grid,
    solver: &dyn LinearSystemBackend,
) -> ShiftResult<BorderExchanges> {
    let flow = dc_load_flow(grid, solver)?;
    let mut exchanges = BorderExchanges::new();
    for edge in grid.graph.edge_weights() {
        let Some((id, from, to, _)) = closed_ac_reactance(edge) else {
            continue;
        };
        let Some(mw) = flow.flows.get(id) else {
            continue;
        };
        if let (Some(zf), Some(zt)) = (grid.zone_of(from), grid.zone_of(to)) {
            exchanges.record(Border::new(zf, zt), *mw);
        }
    }
    for (bus1, bus2, mw) in active_hvdc_transfers(grid) {
        if let (Some(z1), Some(z2)) = (grid.zone_of(&bus1), grid.zone_of(&bus2)) {
            exchanges.record(Border::new(z1, z2), mw);
        }
    }
    Ok(exchanges)
}

/// Net position of every zone, from measured exchanges.
pub fn net_positions(
    grid: &Grid,
    measurement: &dyn ExchangeMeasurement,
) -> ShiftResult<BTreeMap<Zone, f64>> {
    Ok(measurement.compute_exchanges(grid)?.net_positions())
}

/// Read border exchanges off a grid variant.
pub trait ExchangeMeasurement: Send + Sync {
    fn compute_exchanges(&self, grid: &Grid) -> ShiftResult<BorderExchanges>;
}

/// [`ExchangeMeasurement`] backed by [`dc_load_flow`].
#[derive(Clone)]
pub struct DcExchangeMeasurement {
    solver: Arc<dyn LinearSystemBackend>,
}

impl DcExchangeMeasurement {
    pub fn new(solver: Arc<dyn LinearSystemBackend>) -> Self {
        Self { solver }
    }

    pub fn with_kind(kind: SolverKind) -> Self {
        Self::new(kind.build_solver())
    }
}

impl Default for DcExchangeMeasurement {
    fn default() -> Self {
        Self::with_kind(SolverKind::default())
    }
}

impl ExchangeMeasurement for DcExchangeMeasurement {
    fn compute_exchanges(&self, grid: &Grid) -> ShiftResult<BorderExchanges> {
        compute_exchanges(grid, self.solver.as_ref())
    }
}
