//! Temporary connection of isolated scalable generators.
//!
//! A generator behind an open step-up transformer sits outside the main
//! synchronous component and cannot be scaled. Before scaling, each such
//! generator linked to the grid by exactly one transformer gets that
//! transformer closed on both sides and is itself connected. After
//! scaling, [`ConnectivityPreparer::revert_unused`] restores the generators
//! that are still isolated or were left at zero output.

use crate::error::{ShiftError, ShiftResult};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use swe_core::{main_component_buses, BranchId, GenId, Grid, Megawatts};
use tracing::{debug, info};

/// Pre-preparation state of one generator and its transformer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorState {
    pub generator: GenId,
    pub target_p: Megawatts,
    pub connected: bool,
    pub transformer: BranchId,
    pub transformer_connected1: bool,
    pub transformer_connected2: bool,
}

/// Generators connected for one scaling attempt.
#[derive(Debug, Default)]
pub struct ConnectivityPreparer {
    states: Vec<GeneratorState>,
}

impl ConnectivityPreparer {
    /// Connect every isolated generator of `generators` that hangs on a
    /// single transformer.
    ///
    /// A missing generator, a generator on an unknown bus, or one linked by
    /// several transformers is an error; the grid is only modified after all
    /// generators were checked.
    pub fn prepare(grid: &mut Grid, generators: &[GenId]) -> ShiftResult<Self> {
        let main = main_component_buses(grid);
        let mut states = Vec::new();
        let unique: BTreeSet<&GenId> = generators.iter().collect();

        for id in unique {
            let gen = grid
                .generator(id)
                .ok_or_else(|| ShiftError::missing("generator", id))?;
            if main.contains(&gen.bus) {
                continue;
            }
            if grid.bus(&gen.bus).is_none() {
                return Err(ShiftError::UnresolvedTerminalBus {
                    generator: id.clone(),
                });
            }
            let transformers = grid.transformers_at_bus(&gen.bus);
            let transformer = match transformers.as_slice() {
                [] => continue,
                [single] => *single,
                many => {
                    return Err(ShiftError::AmbiguousTransformerLink {
                        generator: id.clone(),
                        transformers: many.iter().map(|t| t.id.clone()).collect(),
                    })
                }
            };
            states.push(GeneratorState {
                generator: id.clone(),
                target_p: gen.target_p,
                connected: gen.connected,
                transformer: transformer.id.clone(),
                transformer_connected1: transformer.connected1,
                transformer_connected2: transformer.connected2,
            });
        }

        for state in &states {
            if let Some(tx) = grid.transformer_mut(&state.transformer) {
                tx.connected1 = true;
                tx.connected2 = true;
            }
            if let Some(gen) = grid.generator_mut(&state.generator) {
                gen.connected = true;
            }
        }
        if !states.is_empty() {
            debug!(count = states.len(), "connected isolated generators for scaling");
        }
        Ok(Self { states })
    }

    pub fn states(&self) -> &[GeneratorState] {
        &self.states
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Restore generators that stayed outside the main component, or that
    /// had no output before and after scaling. A transformer is reopened
    /// only when every prepared generator behind it was restored.
    ///
    /// Returns the restored generator ids.
    pub fn revert_unused(self, grid: &mut Grid, zero_epsilon: f64) -> ShiftResult<Vec<GenId>> {
        if self.states.is_empty() {
            return Ok(Vec::new());
        }
        let main = main_component_buses(grid);
        let mut reverted = Vec::new();
        let mut kept_transformers: BTreeSet<BranchId> = BTreeSet::new();
        let mut transformer_states: BTreeMap<BranchId, (bool, bool)> = BTreeMap::new();

        for state in &self.states {
            let gen = grid
                .generator(&state.generator)
                .ok_or_else(|| ShiftError::missing("generator", &state.generator))?;
            let isolated = !main.contains(&gen.bus);
            let unused = gen.target_p.is_negligible(zero_epsilon)
                && state.target_p.is_negligible(zero_epsilon);
            transformer_states
                .entry(state.transformer.clone())
                .or_insert((state.transformer_connected1, state.transformer_connected2));
            if isolated || unused {
                reverted.push(state);
            } else {
                kept_transformers.insert(state.transformer.clone());
            }
        }

        for state in &reverted {
            if let Some(gen) = grid.generator_mut(&state.generator) {
                gen.target_p = state.target_p;
                gen.connected = state.connected;
            }
        }
        for (id, (c1, c2)) in transformer_states {
            if kept_transformers.contains(&id) {
                continue;
            }
            if let Some(tx) = grid.transformer_mut(&id) {
                tx.connected1 = c1;
                tx.connected2 = c2;
            }
        }

        let ids: Vec<GenId> = reverted.iter().map(|s| s.generator.clone()).collect();
        if !ids.is_empty() {
            info!(count = ids.len(), "restored unused prepared generators");
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::swe_grid;
    use swe_core::{Bus, BusId, Gen, Kilovolts, Transformer, Zone};

    /// swe_grid plus G_HID on bus ES_G behind open transformer T_HID.
    fn grid_with_hidden_unit(p: f64) -> Grid {
        let mut grid = swe_grid(0.0, 0.0);
        grid.add_bus(Bus::new("ES_G", Zone::Es, Kilovolts(20.0))).unwrap();
        grid.add_generator(
            Gen::new("G_HID", "ES_G")
                .with_p_limits(0.0, 800.0)
                .with_target_p(p)
                .disconnected(),
        )
        .unwrap();
        let mut tx = Transformer::new("T_HID", "ES_G", "ES2", 0.05);
        tx.connected1 = false;
        grid.add_transformer(tx).unwrap();
        grid
    }

    fn hidden() -> Vec<GenId> {
        vec![GenId::new("G_HID"), GenId::new("G_ES1")]
    }

    #[test]
    fn prepare_connects_single_transformer_unit() {
        let mut grid = grid_with_hidden_unit(0.0);
        let prep = ConnectivityPreparer::prepare(&mut grid, &hidden()).unwrap();
        assert_eq!(prep.states().len(), 1);
        assert_eq!(prep.states()[0].transformer, BranchId::new("T_HID"));
        assert!(!prep.states()[0].transformer_connected1);
        assert!(grid.is_in_main_component(&BusId::new("ES_G")));
        assert!(grid.generator(&GenId::new("G_HID")).unwrap().connected);
    }

    #[test]
    fn unused_unit_is_fully_restored() {
        let mut grid = grid_with_hidden_unit(0.0);
        let before = grid.to_document("g");
        let prep = ConnectivityPreparer::prepare(&mut grid, &hidden()).unwrap();
        let reverted = prep.revert_unused(&mut grid, 1e-5).unwrap();
        assert_eq!(reverted, vec![GenId::new("G_HID")]);
        assert_eq!(grid.to_document("g"), before);
    }

    #[test]
    fn scaled_unit_stays_connected() {
        let mut grid = grid_with_hidden_unit(0.0);
        let prep = ConnectivityPreparer::prepare(&mut grid, &hidden()).unwrap();
        grid.generator_mut(&GenId::new("G_HID")).unwrap().target_p = Megawatts(150.0);
        let reverted = prep.revert_unused(&mut grid, 1e-5).unwrap();
        assert!(reverted.is_empty());
        let tx = grid.transformer(&BranchId::new("T_HID")).unwrap();
        assert!(tx.connected1 && tx.connected2);
    }

    #[test]
    fn unit_with_prior_output_is_kept_even_at_zero() {
        let mut grid = grid_with_hidden_unit(50.0);
        let prep = ConnectivityPreparer::prepare(&mut grid, &hidden()).unwrap();
        grid.generator_mut(&GenId::new("G_HID")).unwrap().target_p = Megawatts(0.0);
        assert!(prep.revert_unused(&mut grid, 1e-5).unwrap().is_empty());
    }

    #[test]
    fn unit_still_isolated_after_scaling_is_restored() {
        // T_ISO leads to ES_X, an island of its own.
        let mut grid = swe_grid(0.0, 0.0);
        grid.add_bus(Bus::new("ES_G", Zone::Es, Kilovolts(20.0))).unwrap();
        grid.add_bus(Bus::new("ES_X", Zone::Es, Kilovolts(220.0))).unwrap();
        grid.add_generator(
            Gen::new("G_ISO", "ES_G")
                .with_p_limits(0.0, 800.0)
                .with_target_p(50.0)
                .disconnected(),
        )
        .unwrap();
        let mut tx = Transformer::new("T_ISO", "ES_G", "ES_X", 0.05);
        tx.connected2 = false;
        grid.add_transformer(tx).unwrap();
        let before = grid.to_document("g");

        let ids = vec![GenId::new("G_ISO")];
        let prep = ConnectivityPreparer::prepare(&mut grid, &ids).unwrap();
        assert_eq!(prep.states().len(), 1);
        assert!(!grid.is_in_main_component(&BusId::new("ES_G")));
        grid.generator_mut(&GenId::new("G_ISO")).unwrap().target_p = Megawatts(300.0);

        let reverted = prep.revert_unused(&mut grid, 1e-5).unwrap();
        assert_eq!(reverted, ids);
        let gen = grid.generator(&GenId::new("G_ISO")).unwrap();
        assert_eq!(gen.target_p, Megawatts(50.0));
        assert!(!gen.connected);
        let tx = grid.transformer(&BranchId::new("T_ISO")).unwrap();
        assert!(tx.connected1 && !tx.connected2);
        assert_eq!(grid.to_document("g"), before);
    }

    #[test]
    fn several_transformers_are_ambiguous() {
        let mut grid = grid_with_hidden_unit(0.0);
        let mut second = Transformer::new("T_HID2", "ES_G", "ES1", 0.05);
        second.connected2 = false;
        grid.add_transformer(second).unwrap();
        let before = grid.to_document("g");
        let err = ConnectivityPreparer::prepare(&mut grid, &hidden()).unwrap_err();
        match err {
            ShiftError::AmbiguousTransformerLink { generator, transformers } => {
                assert_eq!(generator, GenId::new("G_HID"));
                assert_eq!(transformers.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(grid.to_document("g"), before);
    }

    #[test]
    fn isolated_unit_without_transformer_is_left_alone() {
        let mut grid = swe_grid(0.0, 0.0);
        grid.add_bus(Bus::new("ISO", Zone::Es, Kilovolts(20.0))).unwrap();
        grid.add_generator(Gen::new("G_ISO", "ISO").disconnected()).unwrap();
        let prep = ConnectivityPreparer::prepare(&mut grid, &[GenId::new("G_ISO")]).unwrap();
        assert!(prep.is_empty());
        assert!(!grid.generator(&GenId::new("G_ISO")).unwrap().connected);
    }

    #[test]
    fn unknown_bus_is_unresolved() {
        let mut grid = swe_grid(0.0, 0.0);
        grid.add_generator(Gen::new("G_LOST", "NOWHERE")).unwrap();
        let err = ConnectivityPreparer::prepare(&mut grid, &[GenId::new("G_LOST")]).unwrap_err();
        assert!(matches!(err, ShiftError::UnresolvedTerminalBus { .. }));
    }
}
