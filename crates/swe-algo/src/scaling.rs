//! Zonal generation scaling (GLSK).
//!
//! A [`ZonalScalableCatalog`] lists, per zone, the generators allowed to
//! move and how a requested delta is spread over them. Scaling only touches
//! generators whose bus lies in the main synchronous component; a
//! disconnected generator there is reconnected when it receives power.
//! The realized delta can fall short of the request when the units run out
//! of room, and the caller decides what a shortfall means.

use crate::error::{ShiftError, ShiftResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use swe_core::{main_component_buses, BusId, GenId, Grid, Megawatts, Zone};
use tracing::debug;

/// Applies a signed MW delta to the generation of one zone.
pub trait ZonalScaling: Send + Sync {
    /// Returns the realized delta (MW), same sign as `delta`.
    fn scale(&self, grid: &mut Grid, zone: Zone, delta: f64) -> ShiftResult<f64>;

    /// Generators the scaling may move in `zone`.
    fn generators(&self, zone: Zone) -> Vec<GenId>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingEligibility {
    #[default]
    Both,
    UpOnly,
    DownOnly,
}

impl ScalingEligibility {
    fn allows(self, upward: bool) -> bool {
        match self {
            ScalingEligibility::Both => true,
            ScalingEligibility::UpOnly => upward,
            ScalingEligibility::DownOnly => !upward,
        }
    }
}

fn default_participation() -> f64 {
    1.0
}

/// One generator of a zone's scalable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalableEntry {
    pub generator: GenId,
    #[serde(default)]
    pub eligibility: ScalingEligibility,
    /// Tighter lower bound than the generator's own pmin
    #[serde(default)]
    pub min_p: Option<f64>,
    /// Tighter upper bound than the generator's own pmax
    #[serde(default)]
    pub max_p: Option<f64>,
    /// Weight under [`ScalingPolicy::Proportional`]
    #[serde(default = "default_participation")]
    pub participation: f64,
}

impl ScalableEntry {
    pub fn new(generator: impl Into<GenId>) -> Self {
        Self {
            generator: generator.into(),
            eligibility: ScalingEligibility::Both,
            min_p: None,
            max_p: None,
            participation: default_participation(),
        }
    }

    pub fn with_eligibility(mut self, eligibility: ScalingEligibility) -> Self {
        self.eligibility = eligibility;
        self
    }

    pub fn with_bounds(mut self, min_p: Option<f64>, max_p: Option<f64>) -> Self {
        self.min_p = min_p;
        self.max_p = max_p;
        self
    }

    pub fn with_participation(mut self, participation: f64) -> Self {
        self.participation = participation;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingPolicy {
    /// Fill entries in list order until the delta is met.
    #[default]
    MeritOrder,
    /// Split by participation weight, redistributing what capped units
    /// cannot take.
    Proportional,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneScalable {
    #[serde(default)]
    pub policy: ScalingPolicy,
    pub entries: Vec<ScalableEntry>,
}

impl ZoneScalable {
    pub fn new(policy: ScalingPolicy, entries: impl IntoIterator<Item = ScalableEntry>) -> Self {
        Self {
            policy,
            entries: entries.into_iter().collect(),
        }
    }
}

/// Per-zone scalables, loadable from a JSON object keyed by zone code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZonalScalableCatalog {
    zones: BTreeMap<Zone, ZoneScalable>,
}

/// A candidate unit with the room it has left in the scaling direction.
struct Candidate {
    generator: GenId,
    room: f64,
    weight: f64,
}

impl ZonalScalableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, zone: Zone, scalable: ZoneScalable) {
        self.zones.insert(zone, scalable);
    }

    pub fn zone(&self, zone: Zone) -> Option<&ZoneScalable> {
        self.zones.get(&zone)
    }

    pub fn from_json_str(json: &str) -> ShiftResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ShiftError::Config(format!("invalid scalable catalog: {e}")))
    }

    pub fn load(path: &Path) -> ShiftResult<Self> {
        let text = std::fs::read_to_string(path).map_err(swe_core::SweError::from)?;
        Self::from_json_str(&text)
    }

    fn candidates(
        &self,
        grid: &Grid,
        scalable: &ZoneScalable,
        main: &HashSet<BusId>,
        upward: bool,
    ) -> ShiftResult<Vec<Candidate>> {
        let mut out = Vec::new();
        for entry in &scalable.entries {
            let gen = grid
                .generator(&entry.generator)
                .ok_or_else(|| ShiftError::missing("generator", &entry.generator))?;
            if !entry.eligibility.allows(upward) || !main.contains(&gen.bus) {
                continue;
            }
            let p = gen.target_p.value();
            let room = if upward {
                let ceiling = entry.max_p.map_or(gen.pmax.value(), |m| m.min(gen.pmax.value()));
                ceiling - p
            } else {
                let floor = entry.min_p.map_or(gen.pmin.value(), |m| m.max(gen.pmin.value()));
                p - floor
            };
            if room > 0.0 {
                out.push(Candidate {
                    generator: entry.generator.clone(),
                    room,
                    weight: entry.participation.max(0.0),
                });
            }
        }
        Ok(out)
    }
}

/// Move one generator by `mw` in the scaling direction.
fn apply(grid: &mut Grid, generator: &GenId, mw: f64, upward: bool) -> ShiftResult<()> {
    let gen = grid
        .generator_mut(generator)
        .ok_or_else(|| ShiftError::missing("generator", generator))?;
    if !gen.connected {
        debug!(generator = %generator, "reconnecting generator for scaling");
        gen.connected = true;
    }
    let signed = if upward { mw } else { -mw };
    gen.target_p += Megawatts(signed);
    Ok(())
}

fn merit_order(grid: &mut Grid, candidates: &[Candidate], amount: f64, upward: bool) -> ShiftResult<f64> {
    let mut remaining = amount;
    for candidate in candidates {
        if remaining <= 0.0 {
            break;
        }
        let take = candidate.room.min(remaining);
        apply(grid, &candidate.generator, take, upward)?;
        remaining -= take;
    }
    Ok(amount - remaining)
}

fn proportional(
    grid: &mut Grid,
    mut candidates: Vec<Candidate>,
    amount: f64,
    upward: bool,
) -> ShiftResult<f64> {
    let mut remaining = amount;
    // Each pass either meets the remainder or caps at least one unit.
    while remaining > 1e-9 {
        candidates.retain(|c| c.room > 1e-9 && c.weight > 0.0);
        let total_weight: f64 = candidates.iter().map(|c| c.weight).sum();
        if candidates.is_empty() || total_weight <= 0.0 {
            break;
        }
        let pass = remaining;
        for candidate in &mut candidates {
            let take = (pass * candidate.weight / total_weight).min(candidate.room);
            apply(grid, &candidate.generator, take, upward)?;
            candidate.room -= take;
            remaining -= take;
        }
    }
    Ok(amount - remaining.max(0.0))
}

impl ZonalScaling for ZonalScalableCatalog {
    fn scale(&self, grid: &mut Grid, zone: Zone, delta: f64) -> ShiftResult<f64> {
        let Some(scalable) = self.zones.get(&zone) else {
            return Ok(0.0);
        };
        if delta == 0.0 {
            return Ok(0.0);
        }
        let upward = delta > 0.0;
        let main = main_component_buses(grid);
        let candidates = self.candidates(grid, scalable, &main, upward)?;
        let realized = match scalable.policy {
            ScalingPolicy::MeritOrder => merit_order(grid, &candidates, delta.abs(), upward)?,
            ScalingPolicy::Proportional => proportional(grid, candidates, delta.abs(), upward)?,
        };
        debug!(zone = %zone, requested = delta, realized = realized.copysign(delta), "zone scaled");
        Ok(realized.copysign(delta))
    }

    fn generators(&self, zone: Zone) -> Vec<GenId> {
        self.zones
            .get(&zone)
            .map(|s| s.entries.iter().map(|e| e.generator.clone()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{swe_catalog, swe_grid};

    fn p(grid: &Grid, id: &str) -> f64 {
        grid.generator(&GenId::new(id)).unwrap().target_p.value()
    }

    #[test]
    fn merit_order_fills_first_unit() {
        let mut grid = swe_grid(0.0, 0.0);
        let realized = swe_catalog().scale(&mut grid, Zone::Fr, -500.0).unwrap();
        assert_eq!(realized, -500.0);
        assert_eq!(p(&grid, "G_FR"), 1500.0);
    }

    #[test]
    fn shortfall_is_reported() {
        let mut grid = swe_grid(0.0, 0.0);
        // G_PT sits at 1000 MW with pmax 3000
        let realized = swe_catalog().scale(&mut grid, Zone::Pt, 2500.0).unwrap();
        assert_eq!(realized, 2000.0);
        assert_eq!(p(&grid, "G_PT"), 3000.0);
    }

    #[test]
    fn proportional_splits_by_weight_and_redistributes() {
        let mut grid = swe_grid(0.0, 0.0);
        let mut catalog = ZonalScalableCatalog::new();
        catalog.insert(
            Zone::Es,
            ZoneScalable::new(
                ScalingPolicy::Proportional,
                [
                    ScalableEntry::new("G_ES1").with_bounds(None, Some(1600.0)),
                    ScalableEntry::new("G_ES2").with_participation(3.0),
                ],
            ),
        );
        // start at 1500 each; G_ES1 can only take 100 of its 250 share
        let realized = catalog.scale(&mut grid, Zone::Es, 1000.0).unwrap();
        assert!((realized - 1000.0).abs() < 1e-9);
        assert!((p(&grid, "G_ES1") - 1600.0).abs() < 1e-9);
        assert!((p(&grid, "G_ES2") - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn eligibility_filters_direction() {
        let mut grid = swe_grid(0.0, 0.0);
        let mut catalog = ZonalScalableCatalog::new();
        catalog.insert(
            Zone::Fr,
            ZoneScalable::new(
                ScalingPolicy::MeritOrder,
                [ScalableEntry::new("G_FR").with_eligibility(ScalingEligibility::UpOnly)],
            ),
        );
        assert_eq!(catalog.scale(&mut grid, Zone::Fr, -100.0).unwrap(), 0.0);
        assert_eq!(catalog.scale(&mut grid, Zone::Fr, 100.0).unwrap(), 100.0);
    }

    #[test]
    fn units_outside_main_component_are_skipped() {
        let mut grid = swe_grid(0.0, 0.0);
        grid.line_mut(&swe_core::BranchId::new("ES1-PT1"))
            .unwrap()
            .connected1 = false;
        let realized = swe_catalog().scale(&mut grid, Zone::Pt, 100.0).unwrap();
        assert_eq!(realized, 0.0);
        assert_eq!(p(&grid, "G_PT"), 1000.0);
    }

    #[test]
    fn disconnected_unit_is_reconnected_when_moved() {
        let mut grid = swe_grid(0.0, 0.0);
        grid.generator_mut(&GenId::new("G_FR")).unwrap().connected = false;
        swe_catalog().scale(&mut grid, Zone::Fr, 10.0).unwrap();
        assert!(grid.generator(&GenId::new("G_FR")).unwrap().connected);
    }

    #[test]
    fn unknown_generator_is_missing_element() {
        let mut grid = swe_grid(0.0, 0.0);
        let mut catalog = ZonalScalableCatalog::new();
        catalog.insert(Zone::Fr, ZoneScalable::new(ScalingPolicy::MeritOrder, [ScalableEntry::new("NOPE")]));
        let err = catalog.scale(&mut grid, Zone::Fr, 10.0).unwrap_err();
        assert!(matches!(err, ShiftError::MissingElement { kind: "generator", .. }));
    }

    #[test]
    fn catalog_parses_from_json() {
        let json = r#"{
            "FR": { "policy": "merit_order", "entries": [ { "generator": "G_FR", "max_p": 2500.0 } ] },
            "ES": { "entries": [ { "generator": "G_ES1", "eligibility": "down_only" } ] }
        }"#;
        let catalog = ZonalScalableCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.generators(Zone::Fr), vec![GenId::new("G_FR")]);
        assert_eq!(
            catalog.zone(Zone::Es).unwrap().entries[0].eligibility,
            ScalingEligibility::DownOnly
        );
        assert!(catalog.generators(Zone::Pt).is_empty());
    }
}
