//! Zonal dispatch: turn a bisection step into per-zone deltas.
//!
//! A step is an exchange target on the direction's reference border (ES-FR
//! or ES-PT). The dispatcher plans the foreign zones' deltas from their
//! initial net positions; Spain is the balancing zone and always receives
//! minus the sum of the others, so every plan is zero-sum.
//!
//! The two process types differ on the secondary border:
//! - D2CC keeps it at its initial exchange, and the non-targeted foreign
//!   zone does not move.
//! - IDCC brings it to zero, so the non-targeted foreign zone is moved to a
//!   zero net position.

use crate::error::ShiftError;
use crate::exchange::Border;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use swe_core::Zone;

/// One of the four capacity directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "ES_FR")]
    EsFr,
    #[serde(rename = "FR_ES")]
    FrEs,
    #[serde(rename = "ES_PT")]
    EsPt,
    #[serde(rename = "PT_ES")]
    PtEs,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::EsFr,
        Direction::FrEs,
        Direction::EsPt,
        Direction::PtEs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::EsFr => "ES_FR",
            Direction::FrEs => "FR_ES",
            Direction::EsPt => "ES_PT",
            Direction::PtEs => "PT_ES",
        }
    }

    /// +1 when Spain exports, -1 when it imports.
    pub fn sign(self) -> f64 {
        match self {
            Direction::EsFr | Direction::EsPt => 1.0,
            Direction::FrEs | Direction::PtEs => -1.0,
        }
    }

    /// Foreign zone whose border carries the step.
    pub fn targeted_zone(self) -> Zone {
        match self {
            Direction::EsFr | Direction::FrEs => Zone::Fr,
            Direction::EsPt | Direction::PtEs => Zone::Pt,
        }
    }

    pub fn other_zone(self) -> Zone {
        match self {
            Direction::EsFr | Direction::FrEs => Zone::Pt,
            Direction::EsPt | Direction::PtEs => Zone::Fr,
        }
    }

    pub fn reference_border(self) -> Border {
        Border::new(Zone::Es, self.targeted_zone())
    }

    pub fn secondary_border(self) -> Border {
        Border::new(Zone::Es, self.other_zone())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ShiftError::Config(format!("unknown direction '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    /// Two-days-ahead coordinated capacity
    #[default]
    D2cc,
    /// Intraday coordinated capacity
    Idcc,
}

impl ProcessType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessType::D2cc => "d2cc",
            ProcessType::Idcc => "idcc",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessType {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "d2cc" => Ok(ProcessType::D2cc),
            "idcc" => Ok(ProcessType::Idcc),
            other => Err(ShiftError::Config(format!("unknown process type '{other}'"))),
        }
    }
}

/// Per-zone MW deltas. Positive raises the zone's generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchPlan {
    balancing_zone: Zone,
    deltas: BTreeMap<Zone, f64>,
}

impl DispatchPlan {
    /// Plan the controlled zones and give `balancing_zone` the opposite of
    /// their sum.
    pub fn balanced(balancing_zone: Zone, controlled: impl IntoIterator<Item = (Zone, f64)>) -> Self {
        let mut deltas: BTreeMap<Zone, f64> = controlled
            .into_iter()
            .filter(|(zone, _)| *zone != balancing_zone)
            .collect();
        let others: f64 = deltas.values().sum();
        deltas.insert(balancing_zone, -others);
        Self {
            balancing_zone,
            deltas,
        }
    }

    pub fn balancing_zone(&self) -> Zone {
        self.balancing_zone
    }

    pub fn delta(&self, zone: Zone) -> f64 {
        self.deltas.get(&zone).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Zone, f64)> + '_ {
        self.deltas.iter().map(|(zone, mw)| (*zone, *mw))
    }

    pub fn total(&self) -> f64 {
        self.deltas.values().sum()
    }

    /// Shift `mw` out of the zone controlling `border` into the balancing
    /// zone. A positive mismatch (target above measured ES export) lowers
    /// the foreign zone and raises Spain by the same amount.
    pub fn correct(&mut self, border: Border, mismatch: f64) {
        let controlling = if border.from == self.balancing_zone {
            border.to
        } else {
            border.from
        };
        *self.deltas.entry(controlling).or_insert(0.0) -= mismatch;
        *self.deltas.entry(self.balancing_zone).or_insert(0.0) += mismatch;
    }
}

/// Exchange the shifter must reach on one border.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderTarget {
    pub border: Border,
    pub target: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderTargets {
    pub reference: BorderTarget,
    pub secondary: BorderTarget,
}

/// Computes the plan and targets for a step of one direction.
pub trait ShiftDispatcher: Send + Sync {
    fn direction(&self) -> Direction;
    fn dispatch(&self, step: f64) -> DispatchPlan;
    fn targets(&self, step: f64) -> BorderTargets;
}

fn initial_of(initial: &BTreeMap<Zone, f64>, zone: Zone) -> Result<f64, ShiftError> {
    initial
        .get(&zone)
        .copied()
        .ok_or_else(|| ShiftError::Config(format!("missing initial net position for {zone}")))
}

/// D2CC: secondary border held at its initial exchange.
#[derive(Debug, Clone)]
pub struct SweD2ccShiftDispatcher {
    direction: Direction,
    initial_targeted: f64,
    initial_other: f64,
}

impl SweD2ccShiftDispatcher {
    pub fn new(direction: Direction, initial: &BTreeMap<Zone, f64>) -> Result<Self, ShiftError> {
        Ok(Self {
            direction,
            initial_targeted: initial_of(initial, direction.targeted_zone())?,
            initial_other: initial_of(initial, direction.other_zone())?,
        })
    }
}

impl ShiftDispatcher for SweD2ccShiftDispatcher {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn dispatch(&self, step: f64) -> DispatchPlan {
        let d = self.direction;
        DispatchPlan::balanced(
            Zone::Es,
            [
                (d.targeted_zone(), -d.sign() * step - self.initial_targeted),
                (d.other_zone(), 0.0),
            ],
        )
    }

    fn targets(&self, step: f64) -> BorderTargets {
        let d = self.direction;
        BorderTargets {
            reference: BorderTarget {
                border: d.reference_border(),
                target: d.sign() * step,
            },
            secondary: BorderTarget {
                border: d.secondary_border(),
                // radial: the ES export to a foreign zone is minus its NP
                target: -self.initial_other,
            },
        }
    }
}

/// IDCC: secondary border brought to zero.
#[derive(Debug, Clone)]
pub struct SweIdccShiftDispatcher {
    direction: Direction,
    initial_targeted: f64,
    initial_other: f64,
}

impl SweIdccShiftDispatcher {
    pub fn new(direction: Direction, initial: &BTreeMap<Zone, f64>) -> Result<Self, ShiftError> {
        Ok(Self {
            direction,
            initial_targeted: initial_of(initial, direction.targeted_zone())?,
            initial_other: initial_of(initial, direction.other_zone())?,
        })
    }
}

impl ShiftDispatcher for SweIdccShiftDispatcher {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn dispatch(&self, step: f64) -> DispatchPlan {
        let d = self.direction;
        DispatchPlan::balanced(
            Zone::Es,
            [
                (d.targeted_zone(), -d.sign() * step - self.initial_targeted),
                (d.other_zone(), -self.initial_other),
            ],
        )
    }

    fn targets(&self, step: f64) -> BorderTargets {
        let d = self.direction;
        BorderTargets {
            reference: BorderTarget {
                border: d.reference_border(),
                target: d.sign() * step,
            },
            secondary: BorderTarget {
                border: d.secondary_border(),
                target: 0.0,
            },
        }
    }
}

/// Dispatcher for `process` and `direction` from the zones' initial net
/// positions.
pub fn build_dispatcher(
    process: ProcessType,
    direction: Direction,
    initial: &BTreeMap<Zone, f64>,
) -> Result<Box<dyn ShiftDispatcher>, ShiftError> {
    Ok(match process {
        ProcessType::D2cc => Box::new(SweD2ccShiftDispatcher::new(direction, initial)?),
        ProcessType::Idcc => Box::new(SweIdccShiftDispatcher::new(direction, initial)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initial(fr: f64, es: f64, pt: f64) -> BTreeMap<Zone, f64> {
        BTreeMap::from([(Zone::Fr, fr), (Zone::Es, es), (Zone::Pt, pt)])
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("ES_FR".parse::<Direction>().unwrap(), Direction::EsFr);
        assert_eq!("pt_es".parse::<Direction>().unwrap(), Direction::PtEs);
        let err = "ES_IT".parse::<Direction>().unwrap_err();
        assert!(matches!(err, ShiftError::Config(_)));
    }

    #[test]
    fn es_fr_step_from_balanced_position() {
        let dispatcher = SweD2ccShiftDispatcher::new(Direction::EsFr, &initial(0.0, 0.0, 0.0)).unwrap();
        let plan = dispatcher.dispatch(1000.0);
        assert_eq!(plan.delta(Zone::Fr), -1000.0);
        assert_eq!(plan.delta(Zone::Pt), 0.0);
        assert_eq!(plan.delta(Zone::Es), 1000.0);

        let targets = dispatcher.targets(1000.0);
        assert_eq!(targets.reference.border, Border::ES_FR);
        assert_eq!(targets.reference.target, 1000.0);
        assert_eq!(targets.secondary.border, Border::ES_PT);
        assert_eq!(targets.secondary.target, 0.0);
    }

    #[test]
    fn es_fr_step_from_existing_exchange() {
        let np = initial(-300.0, 300.0, 0.0);
        let plan = SweD2ccShiftDispatcher::new(Direction::EsFr, &np)
            .unwrap()
            .dispatch(1000.0);
        // -1000 - (-300)
        assert_eq!(plan.delta(Zone::Fr), -700.0);
        assert_eq!(plan.delta(Zone::Pt), 0.0);
        // 1000 - 300
        assert_eq!(plan.delta(Zone::Es), 700.0);
        assert_eq!(plan.total(), 0.0);
    }

    #[test]
    fn plans_are_zero_sum_in_every_direction() {
        let np = initial(-350.0, 500.0, -150.0);
        for process in [ProcessType::D2cc, ProcessType::Idcc] {
            for direction in Direction::ALL {
                let dispatcher = build_dispatcher(process, direction, &np).unwrap();
                for step in [0.0, 400.0, 2750.5] {
                    let plan = dispatcher.dispatch(step);
                    assert!(plan.total().abs() < 1e-9, "{process} {direction} {step}");
                }
            }
        }
    }

    #[test]
    fn import_directions_flip_sign() {
        let np = initial(200.0, -200.0, 0.0);
        let plan = SweD2ccShiftDispatcher::new(Direction::FrEs, &np).unwrap().dispatch(1000.0);
        // FR must end at +1000 NP from +200
        assert_eq!(plan.delta(Zone::Fr), 800.0);
        assert_eq!(plan.delta(Zone::Es), -800.0);

        let targets = SweD2ccShiftDispatcher::new(Direction::PtEs, &np).unwrap().targets(500.0);
        assert_eq!(targets.reference.border, Border::ES_PT);
        assert_eq!(targets.reference.target, -500.0);
    }

    #[test]
    fn idcc_zeroes_secondary_zone() {
        let np = initial(-300.0, 100.0, 200.0);
        let dispatcher = SweIdccShiftDispatcher::new(Direction::EsFr, &np).unwrap();
        let plan = dispatcher.dispatch(1000.0);
        assert_eq!(plan.delta(Zone::Fr), -700.0);
        assert_eq!(plan.delta(Zone::Pt), -200.0);
        assert_eq!(plan.delta(Zone::Es), 900.0);
        assert_eq!(dispatcher.targets(1000.0).secondary.target, 0.0);

        let d2cc = SweD2ccShiftDispatcher::new(Direction::EsFr, &np).unwrap();
        assert_eq!(d2cc.dispatch(1000.0).delta(Zone::Pt), 0.0);
        assert_eq!(d2cc.targets(1000.0).secondary.target, -200.0);
    }

    #[test]
    fn correction_moves_mismatch_to_balancing_zone() {
        let mut plan = DispatchPlan::balanced(Zone::Es, [(Zone::Fr, -1000.0), (Zone::Pt, 0.0)]);
        plan.correct(Border::ES_FR, 12.5);
        plan.correct(Border::ES_PT, -4.0);
        assert_eq!(plan.delta(Zone::Fr), -1012.5);
        assert_eq!(plan.delta(Zone::Pt), 4.0);
        assert_eq!(plan.delta(Zone::Es), 1008.5);
        assert!(plan.total().abs() < 1e-9);
    }

    #[test]
    fn missing_initial_position_is_config_error() {
        let np = BTreeMap::from([(Zone::Fr, 0.0)]);
        assert!(matches!(
            build_dispatcher(ProcessType::Idcc, Direction::EsFr, &np),
            Err(ShiftError::Config(_))
        ));
    }
}
