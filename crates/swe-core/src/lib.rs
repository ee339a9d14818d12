//! # swe-core: grid model for the SWE capacity computation
//!
//! Holds the topology the shifting engine mutates at every bisection step.
//!
//! ## Design
//!
//! A [`Grid`] is an undirected multigraph:
//! - **Nodes**: buses, generators, loads and VSC converter stations
//! - **Edges**: AC lines and two-winding transformers between bus nodes,
//!   HVDC lines between their two converter nodes
//!
//! Injections are graph nodes that reference their bus by id rather than
//! through an edge, so connectivity queries only walk AC branches. The
//! graph is a `StableGraph` because the HVDC rewriter creates and removes
//! converters and DC lines; indices of the remaining elements never move.
//!
//! Every element carries a string id, and all ids live in one namespace per
//! grid. A [`Network`] wraps several grids as named variants with
//! copy-on-write sharing (see [`variant`]).
//!
//! ```
//! use swe_core::*;
//!
//! let mut grid = Grid::new();
//! grid.add_bus(Bus::new("ES1", Zone::Es, Kilovolts(400.0))).unwrap();
//! grid.add_bus(Bus::new("FR1", Zone::Fr, Kilovolts(400.0))).unwrap();
//! grid.add_generator(Gen::new("G_ES", "ES1").with_p_limits(0.0, 2000.0)).unwrap();
//! grid.add_load(Load::new("L_FR", "FR1", Megawatts(500.0))).unwrap();
//! grid.add_line(Branch::new("ES1-FR1", "ES1", "FR1", 0.0, 0.01)).unwrap();
//!
//! let network = Network::from_grid("case", grid);
//! assert_eq!(network.grid().stats().num_buses, 2);
//! ```
//!
//! ## Modules
//!
//! - [`variant`] - Named copy-on-write variants ([`Network`])
//! - [`graph_utils`] - Islands and main synchronous component
//! - [`document`] - Serde document format for loading/saving grids
//! - [`solver`] - Dense linear system backends for the DC load flow

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::Undirected;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub mod document;
pub mod error;
pub mod graph_utils;
pub mod solver;
pub mod units;
pub mod variant;

pub use document::{load_network_json, write_network_json, NetworkDocument};
pub use error::{SweError, SweResult};
pub use graph_utils::*;
pub use solver::*;
pub use units::{Kilovolts, Megavars, Megawatts, Ohms, Radians};
pub use variant::{Network, INITIAL_VARIANT_ID};

/// Declares a string-backed identifier newtype.
macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[inline]
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(BusId);
string_id!(GenId);
string_id!(LoadId);
string_id!(BranchId);
string_id!(ConverterId);
string_id!(HvdcLineId);

/// Exchange area of the SWE region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "FR")]
    Fr,
    #[serde(rename = "ES")]
    Es,
    #[serde(rename = "PT")]
    Pt,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Fr, Zone::Es, Zone::Pt];

    /// Two-letter area code.
    pub fn code(self) -> &'static str {
        match self {
            Zone::Fr => "FR",
            Zone::Es => "ES",
            Zone::Pt => "PT",
        }
    }

    /// ENTSO-E EIC code of the bidding zone.
    pub fn eic(self) -> &'static str {
        match self {
            Zone::Fr => "10YFR-RTE------C",
            Zone::Es => "10YES-REE------0",
            Zone::Pt => "10YPT-REN------W",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Zone {
    type Err = SweError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::ALL
            .into_iter()
            .find(|zone| s.eq_ignore_ascii_case(zone.code()) || s == zone.eic())
            .ok_or_else(|| SweError::Config(format!("unknown zone '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    #[serde(default)]
    pub name: String,
    pub zone: Option<Zone>,
    pub nominal_v: Kilovolts,
    /// Last solved voltage magnitude, if a load flow has run
    #[serde(default)]
    pub voltage: Option<Kilovolts>,
}

impl Bus {
    pub fn new(id: impl Into<BusId>, zone: Zone, nominal_v: Kilovolts) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            zone: Some(zone),
            nominal_v,
            voltage: None,
        }
    }

    pub fn with_voltage(mut self, voltage: Kilovolts) -> Self {
        self.voltage = Some(voltage);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gen {
    pub id: GenId,
    #[serde(default)]
    pub name: String,
    pub bus: BusId,
    /// Active power setpoint (MW)
    pub target_p: Megawatts,
    pub pmin: Megawatts,
    pub pmax: Megawatts,
    #[serde(default)]
    pub target_q: Megavars,
    #[serde(default)]
    pub target_v: Option<Kilovolts>,
    #[serde(default)]
    pub voltage_regulator_on: bool,
    pub connected: bool,
}

impl Gen {
    /// Create a connected generator with no active power limits.
    pub fn new(id: impl Into<GenId>, bus: impl Into<BusId>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            bus: bus.into(),
            target_p: Megawatts(0.0),
            pmin: Megawatts(f64::MIN),
            pmax: Megawatts(f64::MAX),
            target_q: Megavars(0.0),
            target_v: None,
            voltage_regulator_on: false,
            connected: true,
        }
    }

    /// Set active power limits (in MW)
    pub fn with_p_limits(mut self, pmin: f64, pmax: f64) -> Self {
        self.pmin = Megawatts(pmin);
        self.pmax = Megawatts(pmax);
        self
    }

    pub fn with_target_p(mut self, target_p: f64) -> Self {
        self.target_p = Megawatts(target_p);
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub id: LoadId,
    #[serde(default)]
    pub name: String,
    pub bus: BusId,
    /// Active power demand (MW)
    pub p0: Megawatts,
    #[serde(default)]
    pub q0: Megavars,
    pub connected: bool,
}

impl Load {
    pub fn new(id: impl Into<LoadId>, bus: impl Into<BusId>, p0: Megawatts) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            bus: bus.into(),
            p0,
            q0: Megavars(0.0),
            connected: true,
        }
    }
}

/// VSC converter station terminating one side of an HVDC line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterStation {
    pub id: ConverterId,
    #[serde(default)]
    pub name: String,
    pub bus: BusId,
    /// Loss factor in percent of the transmitted power
    pub loss_factor: f64,
    pub voltage_setpoint: Kilovolts,
    pub reactive_power_setpoint: Megavars,
    pub voltage_regulator_on: bool,
    pub connected: bool,
}

/// AC line. `connected1`/`connected2` are the terminal states at `from_bus`/`to_bus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    #[serde(default)]
    pub name: String,
    pub from_bus: BusId,
    pub to_bus: BusId,
    /// Series resistance (per-unit)
    pub resistance: f64,
    /// Series reactance (per-unit)
    pub reactance: f64,
    pub connected1: bool,
    pub connected2: bool,
}

impl Branch {
    pub fn new(
        id: impl Into<BranchId>,
        from_bus: impl Into<BusId>,
        to_bus: impl Into<BusId>,
        resistance: f64,
        reactance: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            from_bus: from_bus.into(),
            to_bus: to_bus.into(),
            resistance,
            reactance,
            connected1: true,
            connected2: true,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected1 && self.connected2
    }
}

/// Two-winding transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformer {
    pub id: BranchId,
    #[serde(default)]
    pub name: String,
    pub from_bus: BusId,
    pub to_bus: BusId,
    pub ratio: f64,
    /// Series reactance (per-unit)
    pub reactance: f64,
    pub connected1: bool,
    pub connected2: bool,
}

impl Transformer {
    pub fn new(
        id: impl Into<BranchId>,
        from_bus: impl Into<BusId>,
        to_bus: impl Into<BusId>,
        reactance: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            from_bus: from_bus.into(),
            to_bus: to_bus.into(),
            ratio: 1.0,
            reactance,
            connected1: true,
            connected2: true,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected1 && self.connected2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConvertersMode {
    /// Power flows from side 1 to side 2
    Side1RectifierSide2Inverter,
    Side1InverterSide2Rectifier,
}

/// Angle droop active power control attached to an HVDC line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleDroopControl {
    pub p0: Megawatts,
    /// MW per degree
    pub droop: f64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HvdcLine {
    pub id: HvdcLineId,
    #[serde(default)]
    pub name: String,
    pub converter1: ConverterId,
    pub converter2: ConverterId,
    pub resistance: Ohms,
    pub nominal_v: Kilovolts,
    pub max_p: Megawatts,
    pub active_power_setpoint: Megawatts,
    pub converters_mode: ConvertersMode,
    #[serde(default)]
    pub droop: Option<AngleDroopControl>,
}

impl HvdcLine {
    pub fn droop_enabled(&self) -> bool {
        self.droop.as_ref().is_some_and(|d| d.enabled)
    }

    /// Signed transfer from side 1 to side 2 (MW).
    pub fn flow_side1_to_side2(&self) -> Megawatts {
        match self.converters_mode {
            ConvertersMode::Side1RectifierSide2Inverter => self.active_power_setpoint,
            ConvertersMode::Side1InverterSide2Rectifier => -self.active_power_setpoint,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Bus(Bus),
    Gen(Gen),
    Load(Load),
    Converter(ConverterStation),
}

#[derive(Debug, Clone)]
pub enum Edge {
    Branch(Branch),
    Transformer(Transformer),
    Hvdc(HvdcLine),
}

/// Topology graph of one variant.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub graph: StableGraph<Node, Edge, Undirected>,
    nodes: HashMap<String, NodeIndex>,
    edges: HashMap<String, EdgeIndex>,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::default(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// True if any node or edge already uses `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id) || self.edges.contains_key(id)
    }

    fn ensure_unique(&self, id: &str) -> SweResult<()> {
        if self.contains(id) {
            return Err(SweError::Validation(format!(
                "element id '{id}' is already used in the network"
            )));
        }
        Ok(())
    }

    fn insert_node(&mut self, id: String, node: Node) -> SweResult<NodeIndex> {
        self.ensure_unique(&id)?;
        let idx = self.graph.add_node(node);
        self.nodes.insert(id, idx);
        Ok(idx)
    }

    fn insert_edge(&mut self, id: String, a: &str, b: &str, edge: Edge) -> SweResult<EdgeIndex> {
        self.ensure_unique(&id)?;
        let a_idx = self.node_index(a)?;
        let b_idx = self.node_index(b)?;
        let idx = self.graph.add_edge(a_idx, b_idx, edge);
        self.edges.insert(id, idx);
        Ok(idx)
    }

    fn node_index(&self, id: &str) -> SweResult<NodeIndex> {
        self.nodes
            .get(id)
            .copied()
            .ok_or_else(|| SweError::Network(format!("unknown element '{id}'")))
    }

    fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id).and_then(|&idx| self.graph.node_weight(idx))
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.nodes.get(id)?;
        self.graph.node_weight_mut(idx)
    }

    fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id).and_then(|&idx| self.graph.edge_weight(idx))
    }

    fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        let idx = *self.edges.get(id)?;
        self.graph.edge_weight_mut(idx)
    }

    pub fn add_bus(&mut self, bus: Bus) -> SweResult<NodeIndex> {
        self.insert_node(bus.id.to_string(), Node::Bus(bus))
    }

    pub fn add_generator(&mut self, gen: Gen) -> SweResult<NodeIndex> {
        self.insert_node(gen.id.to_string(), Node::Gen(gen))
    }

    pub fn add_load(&mut self, load: Load) -> SweResult<NodeIndex> {
        self.insert_node(load.id.to_string(), Node::Load(load))
    }

    pub fn add_converter(&mut self, converter: ConverterStation) -> SweResult<NodeIndex> {
        self.insert_node(converter.id.to_string(), Node::Converter(converter))
    }

    pub fn add_line(&mut self, branch: Branch) -> SweResult<EdgeIndex> {
        let (from, to) = (branch.from_bus.to_string(), branch.to_bus.to_string());
        self.insert_edge(branch.id.to_string(), &from, &to, Edge::Branch(branch))
    }

    pub fn add_transformer(&mut self, transformer: Transformer) -> SweResult<EdgeIndex> {
        let (from, to) = (
            transformer.from_bus.to_string(),
            transformer.to_bus.to_string(),
        );
        self.insert_edge(
            transformer.id.to_string(),
            &from,
            &to,
            Edge::Transformer(transformer),
        )
    }

    /// Add an HVDC line between two existing converter stations.
    pub fn add_hvdc_line(&mut self, line: HvdcLine) -> SweResult<EdgeIndex> {
        for converter in [&line.converter1, &line.converter2] {
            if self.converter(converter).is_none() {
                return Err(SweError::Validation(format!(
                    "HVDC line '{}' references unknown converter station '{}'",
                    line.id, converter
                )));
            }
        }
        let (c1, c2) = (line.converter1.to_string(), line.converter2.to_string());
        self.insert_edge(line.id.to_string(), &c1, &c2, Edge::Hvdc(line))
    }

    pub fn remove_hvdc_line(&mut self, id: &HvdcLineId) -> SweResult<HvdcLine> {
        match self.edge(id.as_str()) {
            Some(Edge::Hvdc(_)) => {}
            _ => return Err(SweError::Network(format!("unknown HVDC line '{id}'"))),
        }
        let idx = self.edges.remove(id.as_str()).ok_or_else(|| {
            SweError::Network(format!("unknown HVDC line '{id}'"))
        })?;
        match self.graph.remove_edge(idx) {
            Some(Edge::Hvdc(line)) => Ok(line),
            _ => Err(SweError::Network(format!("unknown HVDC line '{id}'"))),
        }
    }

    /// Remove a converter station. Fails while an HVDC line still uses it.
    pub fn remove_converter(&mut self, id: &ConverterId) -> SweResult<ConverterStation> {
        let idx = match self.node(id.as_str()) {
            Some(Node::Converter(_)) => self.node_index(id.as_str())?,
            _ => {
                return Err(SweError::Network(format!(
                    "unknown converter station '{id}'"
                )))
            }
        };
        if self.graph.edges(idx).next().is_some() {
            return Err(SweError::Validation(format!(
                "converter station '{id}' is still attached to an HVDC line"
            )));
        }
        self.nodes.remove(id.as_str());
        match self.graph.remove_node(idx) {
            Some(Node::Converter(converter)) => Ok(converter),
            _ => Err(SweError::Network(format!(
                "unknown converter station '{id}'"
            ))),
        }
    }

    pub fn bus(&self, id: &BusId) -> Option<&Bus> {
        match self.node(id.as_str())? {
            Node::Bus(bus) => Some(bus),
            _ => None,
        }
    }

    pub fn bus_mut(&mut self, id: &BusId) -> Option<&mut Bus> {
        match self.node_mut(id.as_str())? {
            Node::Bus(bus) => Some(bus),
            _ => None,
        }
    }

    pub fn generator(&self, id: &GenId) -> Option<&Gen> {
        match self.node(id.as_str())? {
            Node::Gen(gen) => Some(gen),
            _ => None,
        }
    }

    pub fn generator_mut(&mut self, id: &GenId) -> Option<&mut Gen> {
        match self.node_mut(id.as_str())? {
            Node::Gen(gen) => Some(gen),
            _ => None,
        }
    }

    pub fn load(&self, id: &LoadId) -> Option<&Load> {
        match self.node(id.as_str())? {
            Node::Load(load) => Some(load),
            _ => None,
        }
    }

    pub fn load_mut(&mut self, id: &LoadId) -> Option<&mut Load> {
        match self.node_mut(id.as_str())? {
            Node::Load(load) => Some(load),
            _ => None,
        }
    }

    pub fn converter(&self, id: &ConverterId) -> Option<&ConverterStation> {
        match self.node(id.as_str())? {
            Node::Converter(converter) => Some(converter),
            _ => None,
        }
    }

    pub fn converter_mut(&mut self, id: &ConverterId) -> Option<&mut ConverterStation> {
        match self.node_mut(id.as_str())? {
            Node::Converter(converter) => Some(converter),
            _ => None,
        }
    }

    pub fn line(&self, id: &BranchId) -> Option<&Branch> {
        match self.edge(id.as_str())? {
            Edge::Branch(branch) => Some(branch),
            _ => None,
        }
    }

    pub fn line_mut(&mut self, id: &BranchId) -> Option<&mut Branch> {
        match self.edge_mut(id.as_str())? {
            Edge::Branch(branch) => Some(branch),
            _ => None,
        }
    }

    pub fn transformer(&self, id: &BranchId) -> Option<&Transformer> {
        match self.edge(id.as_str())? {
            Edge::Transformer(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn transformer_mut(&mut self, id: &BranchId) -> Option<&mut Transformer> {
        match self.edge_mut(id.as_str())? {
            Edge::Transformer(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn hvdc_line(&self, id: &HvdcLineId) -> Option<&HvdcLine> {
        match self.edge(id.as_str())? {
            Edge::Hvdc(line) => Some(line),
            _ => None,
        }
    }

    pub fn hvdc_line_mut(&mut self, id: &HvdcLineId) -> Option<&mut HvdcLine> {
        match self.edge_mut(id.as_str())? {
            Edge::Hvdc(line) => Some(line),
            _ => None,
        }
    }

    pub fn buses(&self) -> Vec<&Bus> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Bus(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn generators(&self) -> Vec<&Gen> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Gen(g) => Some(g),
                _ => None,
            })
            .collect()
    }

    pub fn loads(&self) -> Vec<&Load> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Load(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub fn converters(&self) -> Vec<&ConverterStation> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Converter(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<&Branch> {
        self.graph
            .edge_weights()
            .filter_map(|e| match e {
                Edge::Branch(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn transformers(&self) -> Vec<&Transformer> {
        self.graph
            .edge_weights()
            .filter_map(|e| match e {
                Edge::Transformer(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn hvdc_lines(&self) -> Vec<&HvdcLine> {
        self.graph
            .edge_weights()
            .filter_map(|e| match e {
                Edge::Hvdc(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    /// Two-winding transformers with either winding on `bus_id`, sorted by id.
    pub fn transformers_at_bus(&self, bus_id: &BusId) -> Vec<&Transformer> {
        let mut found: Vec<&Transformer> = self
            .transformers()
            .into_iter()
            .filter(|tx| &tx.from_bus == bus_id || &tx.to_bus == bus_id)
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    /// Zone of the bus an element is attached to.
    pub fn zone_of(&self, bus_id: &BusId) -> Option<Zone> {
        self.bus(bus_id).and_then(|bus| bus.zone)
    }

    /// Total active power of connected generators (MW)
    pub fn total_generation_mw(&self) -> f64 {
        self.generators()
            .into_iter()
            .filter(|g| g.connected)
            .map(|g| g.target_p.value())
            .sum()
    }

    /// Total active power of connected loads (MW)
    pub fn total_load_mw(&self) -> f64 {
        self.loads()
            .into_iter()
            .filter(|l| l.connected)
            .map(|l| l.p0.value())
            .sum()
    }

    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats::default();
        for node in self.graph.node_weights() {
            match node {
                Node::Bus(_) => stats.num_buses += 1,
                Node::Gen(g) => {
                    stats.num_gens += 1;
                    if g.connected {
                        stats.total_generation_mw += g.target_p.value();
                    }
                }
                Node::Load(l) => {
                    stats.num_loads += 1;
                    if l.connected {
                        stats.total_load_mw += l.p0.value();
                    }
                }
                Node::Converter(_) => stats.num_converters += 1,
            }
        }
        for edge in self.graph.edge_weights() {
            match edge {
                Edge::Branch(_) | Edge::Transformer(_) => stats.num_branches += 1,
                Edge::Hvdc(_) => stats.num_hvdc_lines += 1,
            }
        }
        stats
    }
}

/// Element counts and balance of one grid variant.
#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub num_buses: usize,
    pub num_gens: usize,
    pub num_loads: usize,
    pub num_converters: usize,
    pub num_branches: usize,
    pub num_hvdc_lines: usize,
    pub total_generation_mw: f64,
    pub total_load_mw: f64,
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} buses, {} branches, {} HVDC lines, {} gens ({:.0} MW), {} loads ({:.0} MW)",
            self.num_buses,
            self.num_branches,
            self.num_hvdc_lines,
            self.num_gens,
            self.total_generation_mw,
            self.num_loads,
            self.total_load_mw
        )
    }
}

impl Edge {
    /// AC edges connected on both sides; these define synchronous areas.
    pub fn is_closed_ac(&self) -> bool {
        match self {
            Edge::Branch(branch) => branch.is_connected(),
            Edge::Transformer(tx) => tx.is_connected(),
            Edge::Hvdc(_) => false,
        }
    }
}
