use super::parameters::{HvdcCreationParameters, HvdcCreationParametersSet, TwoSides};
use crate::error::{HvdcError, HvdcResult};
use std::collections::BTreeSet;
use swe_core::{
    AngleDroopControl, ConverterId, ConverterStation, ConvertersMode, Grid, HvdcLine, Kilovolts, Megavars,
    Megawatts, Ohms,
};
use tracing::info;

fn missing(params: &HvdcCreationParameters, kind: &'static str, id: impl ToString) -> HvdcError {
    HvdcError::MissingElement {
        hvdc: params.id.to_string(),
        kind,
        id: id.to_string(),
    }
}

/// Every element the AC-equivalent model of `params` is made of.
fn check_equivalent_model(grid: &Grid, params: &HvdcCreationParameters) -> HvdcResult<()> {
    for side in TwoSides::BOTH {
        let gen = params.equivalent_generator(side)?;
        grid.generator(gen)
            .ok_or_else(|| missing(params, "generator", gen))?;
        let load = params.equivalent_load(side)?;
        grid.load(load).ok_or_else(|| missing(params, "load", load))?;
    }
    grid.line(&params.equivalent_ac_line_id)
        .ok_or_else(|| missing(params, "AC line", &params.equivalent_ac_line_id))?;
    Ok(())
}

/// Record the ids `entry` creates or rewrites. An id claimed twice in one
/// parameter set would make a later entry fail after earlier ones were
/// applied.
fn claim_ids(
    claimed: &mut BTreeSet<String>,
    entry: &HvdcCreationParameters,
    new_ids: Vec<String>,
) -> HvdcResult<()> {
    let mut ids = new_ids;
    for side in TwoSides::BOTH {
        ids.push(entry.equivalent_generator(side)?.to_string());
        ids.push(entry.equivalent_load(side)?.to_string());
    }
    ids.push(entry.equivalent_ac_line_id.to_string());
    for id in ids {
        if !claimed.insert(id.clone()) {
            return Err(HvdcError::Parameters(format!(
                "'{}': id '{id}' appears more than once in the HVDC parameters",
                entry.id
            )));
        }
    }
    Ok(())
}

/// Replace AC-equivalent models (one generator and one load per side plus
/// an AC line) by explicit HVDC lines between two VSC converter stations.
///
/// The equivalent generators and loads are disconnected. Each converter is
/// placed on the bus of its side's generator and takes that bus voltage as
/// setpoint when the generator was connected, the configured default
/// otherwise. The new line starts at 0 MW, side 1 rectifier. The AC line is
/// opened on each side that was connected, and the converter of that side
/// is connected in its place.
///
/// All entries are checked before the grid is touched.
pub fn replace_equivalent_model_by_hvdc(
    grid: &mut Grid,
    params: &HvdcCreationParametersSet,
) -> HvdcResult<()> {
    let entries = params.sorted();
    let mut claimed = BTreeSet::new();
    for entry in &entries {
        entry.validate()?;
        check_equivalent_model(grid, entry)?;
        let mut new_ids = vec![entry.id.to_string()];
        for side in TwoSides::BOTH {
            new_ids.push(entry.vsc(side)?.id.to_string());
        }
        if let Some(taken) = new_ids.iter().find(|id| grid.contains(id)) {
            return Err(HvdcError::Parameters(format!(
                "'{}': id '{taken}' is already used in the network",
                entry.id
            )));
        }
        claim_ids(&mut claimed, entry, new_ids)?;
    }

    for entry in entries {
        let mut converter_ids = Vec::with_capacity(2);
        for side in TwoSides::BOTH {
            let vsc = entry.vsc(side)?;
            let gen_id = entry.equivalent_generator(side)?;
            let gen = grid
                .generator_mut(gen_id)
                .ok_or_else(|| missing(entry, "generator", gen_id))?;
            let was_connected = gen.connected;
            let bus = gen.bus.clone();
            gen.connected = false;

            let load_id = entry.equivalent_load(side)?;
            grid.load_mut(load_id)
                .ok_or_else(|| missing(entry, "load", load_id))?
                .connected = false;

            let voltage_setpoint = if was_connected {
                grid.bus(&bus).and_then(|b| b.voltage)
            } else {
                None
            }
            .unwrap_or(Kilovolts(vsc.default_voltage_setpoint));

            grid.add_converter(ConverterStation {
                id: vsc.id.clone(),
                name: vsc.name.clone().unwrap_or_else(|| vsc.id.to_string()),
                bus,
                loss_factor: vsc.loss_factor,
                voltage_setpoint,
                reactive_power_setpoint: Megavars(vsc.reactive_power_setpoint),
                voltage_regulator_on: vsc.voltage_regulator_on,
                connected: false,
            })?;
            converter_ids.push(vsc.id.clone());
        }

        grid.add_hvdc_line(HvdcLine {
            id: entry.id.clone(),
            name: entry.id.to_string(),
            converter1: converter_ids[0].clone(),
            converter2: converter_ids[1].clone(),
            resistance: Ohms(entry.r),
            nominal_v: Kilovolts(entry.nominal_v),
            max_p: Megawatts(entry.max_p),
            active_power_setpoint: Megawatts::ZERO,
            converters_mode: ConvertersMode::Side1RectifierSide2Inverter,
            droop: entry
                .angle_droop_active_power_control_parameters
                .as_ref()
                .map(|d| AngleDroopControl {
                    p0: Megawatts(d.p0),
                    droop: d.droop,
                    enabled: true,
                }),
        })?;

        let line = grid
            .line_mut(&entry.equivalent_ac_line_id)
            .ok_or_else(|| missing(entry, "AC line", &entry.equivalent_ac_line_id))?;
        let sides = [(line.connected1, &converter_ids[0]), (line.connected2, &converter_ids[1])];
        line.connected1 = false;
        line.connected2 = false;
        for (was_connected, converter) in sides {
            if was_connected {
                if let Some(station) = grid.converter_mut(converter) {
                    station.connected = true;
                }
            }
        }
        info!(hvdc = %entry.id, "AC-equivalent model replaced by HVDC line");
    }
    Ok(())
}

/// Inverse of [`replace_equivalent_model_by_hvdc`].
///
/// The equivalent generators and loads are reconnected. With angle droop
/// enabled they are all set to 0 MW. Otherwise the load on the rectifier
/// side takes the HVDC setpoint, the generator on the inverter side
/// produces it, and the other two are set to 0 MW. The AC line is
/// reconnected on each side whose converter was connected, then the HVDC
/// line and its converters are removed.
pub fn replace_hvdc_by_equivalent_model(
    grid: &mut Grid,
    params: &HvdcCreationParametersSet,
) -> HvdcResult<()> {
    let entries = params.sorted();
    for entry in &entries {
        entry.validate()?;
        check_equivalent_model(grid, entry)?;
        let line = grid
            .hvdc_line(&entry.id)
            .ok_or_else(|| missing(entry, "HVDC line", &entry.id))?;
        for converter in [&line.converter1, &line.converter2] {
            grid.converter(converter)
                .ok_or_else(|| missing(entry, "converter station", converter))?;
        }
    }

    for entry in entries {
        let line = grid
            .hvdc_line(&entry.id)
            .cloned()
            .ok_or_else(|| missing(entry, "HVDC line", &entry.id))?;
        let connected = |id: &ConverterId| grid.converter(id).is_some_and(|c| c.connected);
        let (side1_connected, side2_connected) = (connected(&line.converter1), connected(&line.converter2));

        let setpoint = line.active_power_setpoint.value();
        let (gen_p, load_p) = if line.droop_enabled() {
            ([0.0, 0.0], [0.0, 0.0])
        } else {
            match line.converters_mode {
                ConvertersMode::Side1RectifierSide2Inverter => ([0.0, setpoint], [setpoint, 0.0]),
                ConvertersMode::Side1InverterSide2Rectifier => ([setpoint, 0.0], [0.0, setpoint]),
            }
        };

        for (i, side) in TwoSides::BOTH.into_iter().enumerate() {
            let gen_id = entry.equivalent_generator(side)?;
            let gen = grid
                .generator_mut(gen_id)
                .ok_or_else(|| missing(entry, "generator", gen_id))?;
            gen.connected = true;
            gen.target_p = Megawatts(gen_p[i]);

            let load_id = entry.equivalent_load(side)?;
            let load = grid
                .load_mut(load_id)
                .ok_or_else(|| missing(entry, "load", load_id))?;
            load.connected = true;
            load.p0 = Megawatts(load_p[i]);
        }

        let ac = grid
            .line_mut(&entry.equivalent_ac_line_id)
            .ok_or_else(|| missing(entry, "AC line", &entry.equivalent_ac_line_id))?;
        if side1_connected {
            ac.connected1 = true;
        }
        if side2_connected {
            ac.connected2 = true;
        }

        grid.remove_hvdc_line(&line.id)?;
        grid.remove_converter(&line.converter1)?;
        grid.remove_converter(&line.converter2)?;
        info!(hvdc = %entry.id, "HVDC line replaced by AC-equivalent model");
    }
    Ok(())
}
