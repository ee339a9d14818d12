//! HVDC <-> AC-equivalent rewrites driven by a parameter file.

use std::fs;
use swe_algo::hvdc::TwoSides;
use swe_algo::*;
use swe_core::{
    Branch, BranchId, Bus, ConverterId, Gen, GenId, Grid, HvdcLineId, Kilovolts, Load, LoadId,
    Megawatts, Zone,
};
use tempfile::tempdir;

const PARAMS: &str = r#"{
  "hvdcCreationParameters": [
    {
      "id": "HVDC_FR_ES",
      "maxP": 1000.0,
      "r": 0.5,
      "nominalV": 400.0,
      "angleDroopActivePowerControlParameters": { "droop": 180.0, "p0": 0.0 },
      "vscCreationParameters": {
        "ONE": { "id": "VSC_FR", "reactivePowerSetpoint": 0.0, "lossFactor": 1.0,
                 "voltageRegulatorOn": true, "defaultVoltageSetpoint": 400.0 },
        "TWO": { "id": "VSC_ES", "reactivePowerSetpoint": 0.0, "lossFactor": 1.0,
                 "voltageRegulatorOn": true, "defaultVoltageSetpoint": 400.0 }
      },
      "equivalentGeneratorId": { "ONE": "G1", "TWO": "G2" },
      "equivalentLoadId": { "ONE": "L1", "TWO": "L2" },
      "equivalentAcLineId": "LINE1"
    }
  ]
}"#;

/// Two buses joined by LINE1, with a zero-output generator/load pair on
/// each side standing for the HVDC link.
fn equivalent_grid() -> Grid {
    let mut grid = Grid::new();
    grid.add_bus(Bus::new("FR_B", Zone::Fr, Kilovolts(400.0)).with_voltage(Kilovolts(402.0)))
        .unwrap();
    grid.add_bus(Bus::new("ES_B", Zone::Es, Kilovolts(400.0)).with_voltage(Kilovolts(398.0)))
        .unwrap();
    grid.add_generator(Gen::new("G1", "FR_B").with_p_limits(-1000.0, 1000.0))
        .unwrap();
    grid.add_generator(Gen::new("G2", "ES_B").with_p_limits(-1000.0, 1000.0))
        .unwrap();
    grid.add_load(Load::new("L1", "FR_B", Megawatts::ZERO)).unwrap();
    grid.add_load(Load::new("L2", "ES_B", Megawatts::ZERO)).unwrap();
    grid.add_line(Branch::new("LINE1", "FR_B", "ES_B", 0.0, 0.02))
        .unwrap();
    grid
}

fn load_params() -> HvdcCreationParametersSet {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hvdc.json");
    fs::write(&path, PARAMS).unwrap();
    HvdcCreationParametersSet::load(&path).unwrap()
}

#[test]
fn equivalent_model_becomes_hvdc_link() {
    let mut grid = equivalent_grid();
    replace_equivalent_model_by_hvdc(&mut grid, &load_params()).unwrap();

    for id in ["G1", "G2"] {
        assert!(!grid.generator(&GenId::new(id)).unwrap().connected);
    }
    for id in ["L1", "L2"] {
        assert!(!grid.load(&LoadId::new(id)).unwrap().connected);
    }

    let line = grid.hvdc_line(&HvdcLineId::new("HVDC_FR_ES")).unwrap();
    assert_eq!(line.max_p, Megawatts(1000.0));
    assert_eq!(line.resistance.value(), 0.5);
    assert_eq!(line.nominal_v, Kilovolts(400.0));
    assert_eq!(line.active_power_setpoint, Megawatts::ZERO);
    assert!(line.droop_enabled());

    let fr = grid.converter(&ConverterId::new("VSC_FR")).unwrap();
    assert_eq!(fr.bus.as_str(), "FR_B");
    assert_eq!(fr.voltage_setpoint, Kilovolts(402.0));
    assert!(fr.connected);
    let es = grid.converter(&ConverterId::new("VSC_ES")).unwrap();
    assert_eq!(es.voltage_setpoint, Kilovolts(398.0));

    let ac = grid.line(&BranchId::new("LINE1")).unwrap();
    assert!(!ac.connected1 && !ac.connected2);
}

#[test]
fn round_trip_restores_the_grid() {
    let original = equivalent_grid();
    let params = load_params();
    let mut grid = original.clone();

    replace_equivalent_model_by_hvdc(&mut grid, &params).unwrap();
    replace_hvdc_by_equivalent_model(&mut grid, &params).unwrap();

    assert_eq!(grid.to_document("g"), original.to_document("g"));
    assert_eq!(grid.stats().num_converters, 0);
}

#[test]
fn half_open_ac_line_keeps_its_open_side() {
    let mut grid = equivalent_grid();
    grid.line_mut(&BranchId::new("LINE1")).unwrap().connected2 = false;
    let params = load_params();

    replace_equivalent_model_by_hvdc(&mut grid, &params).unwrap();
    assert!(grid.converter(&ConverterId::new("VSC_FR")).unwrap().connected);
    assert!(!grid.converter(&ConverterId::new("VSC_ES")).unwrap().connected);

    replace_hvdc_by_equivalent_model(&mut grid, &params).unwrap();
    let ac = grid.line(&BranchId::new("LINE1")).unwrap();
    assert!(ac.connected1);
    assert!(!ac.connected2);
}

#[test]
fn setpoint_is_measured_then_moved_to_injections() {
    let mut grid = equivalent_grid();
    let params = load_params();
    replace_equivalent_model_by_hvdc(&mut grid, &params).unwrap();
    let line = grid.hvdc_line_mut(&HvdcLineId::new("HVDC_FR_ES")).unwrap();
    line.droop = None;
    line.active_power_setpoint = Megawatts(400.0);

    let via_hvdc = DcExchangeMeasurement::default().compute_exchanges(&grid).unwrap();
    assert!((via_hvdc.exchange(Border::ES_FR) + 400.0).abs() < 1e-9);

    replace_hvdc_by_equivalent_model(&mut grid, &params).unwrap();
    assert_eq!(grid.load(&LoadId::new("L1")).unwrap().p0, Megawatts(400.0));
    assert_eq!(grid.generator(&GenId::new("G2")).unwrap().target_p, Megawatts(400.0));
    assert_eq!(grid.generator(&GenId::new("G1")).unwrap().target_p, Megawatts::ZERO);
    assert_eq!(grid.load(&LoadId::new("L2")).unwrap().p0, Megawatts::ZERO);
}

#[test]
fn parameters_load_from_file() {
    let set = load_params();
    let entry = &set.hvdc_creation_parameters[0];
    assert_eq!(entry.vsc(TwoSides::One).unwrap().id, ConverterId::new("VSC_FR"));
    assert_eq!(set.sorted().len(), 1);
}
