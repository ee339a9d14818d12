use crate::error::{HvdcError, HvdcResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use swe_core::{BranchId, ConverterId, GenId, HvdcLineId, LoadId};

/// Side of an HVDC link, as keyed in the parameter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TwoSides {
    #[serde(rename = "ONE")]
    One,
    #[serde(rename = "TWO")]
    Two,
}

impl TwoSides {
    pub const BOTH: [TwoSides; 2] = [TwoSides::One, TwoSides::Two];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VscCreationParameters {
    pub id: ConverterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub reactive_power_setpoint: f64,
    pub loss_factor: f64,
    pub voltage_regulator_on: bool,
    /// kV, used when the replaced generator was disconnected
    pub default_voltage_setpoint: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AngleDroopActivePowerControlParameters {
    /// MW per degree
    pub droop: f64,
    #[serde(default)]
    pub p0: f64,
}

/// How one HVDC link maps onto its AC-equivalent representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HvdcCreationParameters {
    pub id: HvdcLineId,
    pub max_p: f64,
    pub r: f64,
    pub nominal_v: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_droop_active_power_control_parameters: Option<AngleDroopActivePowerControlParameters>,
    pub vsc_creation_parameters: BTreeMap<TwoSides, VscCreationParameters>,
    pub equivalent_generator_id: BTreeMap<TwoSides, GenId>,
    pub equivalent_load_id: BTreeMap<TwoSides, LoadId>,
    pub equivalent_ac_line_id: BranchId,
}

impl HvdcCreationParameters {
    fn side<'a, T>(&self, map: &'a BTreeMap<TwoSides, T>, side: TwoSides, what: &str) -> HvdcResult<&'a T> {
        map.get(&side).ok_or_else(|| {
            HvdcError::Parameters(format!("'{}' has no {what} for side {side:?}", self.id))
        })
    }

    pub fn vsc(&self, side: TwoSides) -> HvdcResult<&VscCreationParameters> {
        self.side(&self.vsc_creation_parameters, side, "VSC creation parameters")
    }

    pub fn equivalent_generator(&self, side: TwoSides) -> HvdcResult<&GenId> {
        self.side(&self.equivalent_generator_id, side, "equivalent generator")
    }

    pub fn equivalent_load(&self, side: TwoSides) -> HvdcResult<&LoadId> {
        self.side(&self.equivalent_load_id, side, "equivalent load")
    }

    /// Both sides present and numeric fields in range.
    pub fn validate(&self) -> HvdcResult<()> {
        for side in TwoSides::BOTH {
            self.vsc(side)?;
            self.equivalent_generator(side)?;
            self.equivalent_load(side)?;
        }
        if self.max_p < 0.0 || self.r < 0.0 || self.nominal_v <= 0.0 {
            return Err(HvdcError::Parameters(format!(
                "'{}' needs maxP >= 0, r >= 0 and nominalV > 0",
                self.id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HvdcCreationParametersSet {
    pub hvdc_creation_parameters: Vec<HvdcCreationParameters>,
}

impl HvdcCreationParametersSet {
    pub fn from_json_str(json: &str) -> HvdcResult<Self> {
        let set: Self = serde_json::from_str(json)
            .map_err(|e| HvdcError::Parameters(e.to_string()))?;
        for params in &set.hvdc_creation_parameters {
            params.validate()?;
        }
        Ok(set)
    }

    pub fn load(path: &Path) -> HvdcResult<Self> {
        let text = std::fs::read_to_string(path).map_err(swe_core::SweError::from)?;
        Self::from_json_str(&text)
            .map_err(|e| HvdcError::Parameters(format!("{}: {e}", path.display())))
    }

    /// Entries ordered by HVDC id, the order rewrites are applied in.
    pub fn sorted(&self) -> Vec<&HvdcCreationParameters> {
        let mut entries: Vec<&HvdcCreationParameters> = self.hvdc_creation_parameters.iter().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }
}
