//! HVDC links and their AC-equivalent models.
//!
//! Capacity studies see an HVDC link as a generator/load pair on each side
//! plus a parallel AC line. The rewriter switches a grid between that
//! equivalent and an explicit VSC representation, driven by a JSON file of
//! [`HvdcCreationParameters`]:
//!
//! ```json
//! { "hvdcCreationParameters": [ {
//!     "id": "HVDC_FR_ES", "maxP": 1000.0, "r": 0.5, "nominalV": 400.0,
//!     "angleDroopActivePowerControlParameters": { "droop": 180.0, "p0": 0.0 },
//!     "vscCreationParameters": { "ONE": { ... }, "TWO": { ... } },
//!     "equivalentGeneratorId": { "ONE": "G1", "TWO": "G2" },
//!     "equivalentLoadId": { "ONE": "L1", "TWO": "L2" },
//!     "equivalentAcLineId": "LINE1" } ] }
//! ```

mod parameters;
mod rewrite;

pub use parameters::{
    AngleDroopActivePowerControlParameters, HvdcCreationParameters, HvdcCreationParametersSet,
    TwoSides, VscCreationParameters,
};
pub use rewrite::{replace_equivalent_model_by_hvdc, replace_hvdc_by_equivalent_model};
