//! # swe-algo: network shifting for the SWE capacity computation
//!
//! The bisection over exchange steps lives outside this crate; it calls
//! [`NetworkShifting::shift`] once per trial step. A shift turns the step
//! into zonal deltas, scales generation, measures the resulting border
//! exchanges and corrects until both SWE borders are on target.
//!
//! ## Pipeline
//!
//! | Stage | Module | Entry point |
//! |-------|--------|-------------|
//! | Step to zonal deltas | [`dispatch`] | [`ShiftDispatcher::dispatch`] |
//! | Isolated unit preparation | [`connectivity`] | [`ConnectivityPreparer::prepare`] |
//! | Zonal scaling | [`scaling`] | [`ZonalScaling::scale`] |
//! | Exchange measurement | [`exchange`] | [`ExchangeMeasurement::compute_exchanges`] |
//! | Iterate and commit | [`shift`] | [`NetworkShifter`] |
//!
//! [`hvdc`] switches a grid between explicit HVDC links and their
//! AC-equivalent models.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use swe_algo::test_utils::{swe_catalog, swe_grid};
//! use swe_algo::*;
//! use swe_core::Network;
//!
//! let mut network = Network::from_grid("case", swe_grid(0.0, 0.0));
//! let measurement = Arc::new(DcExchangeMeasurement::default());
//! let initial = net_positions(network.grid(), measurement.as_ref())?;
//! let dispatcher = build_dispatcher(ProcessType::D2cc, Direction::EsFr, &initial)?;
//! let shifter = NetworkShifter::new(
//!     dispatcher,
//!     Arc::new(swe_catalog()),
//!     measurement,
//!     ShiftingConfig::default(),
//! );
//!
//! let outcome = shifter.shift(1000.0, &mut network)?;
//! assert!((outcome.exchanges.exchange(Border::ES_FR) - 1000.0).abs() <= 10.0);
//! # Ok::<(), ShiftError>(())
//! ```

pub mod cancel;
pub mod connectivity;
pub mod dispatch;
pub mod error;
pub mod exchange;
pub mod hvdc;
pub mod scaling;
pub mod shift;
pub mod test_utils;

pub use cancel::CancellationToken;
pub use connectivity::{ConnectivityPreparer, GeneratorState};
pub use dispatch::{
    build_dispatcher, BorderTarget, BorderTargets, Direction, DispatchPlan, ProcessType,
    ShiftDispatcher, SweD2ccShiftDispatcher, SweIdccShiftDispatcher,
};
pub use error::{ErrorKind, HvdcError, HvdcResult, LimitingZone, ShiftError, ShiftResult};
pub use exchange::{
    compute_exchanges, dc_load_flow, net_positions, Border, BorderExchanges, DcExchangeMeasurement,
    DcFlow, ExchangeMeasurement,
};
pub use hvdc::{
    replace_equivalent_model_by_hvdc, replace_hvdc_by_equivalent_model, HvdcCreationParameters,
    HvdcCreationParametersSet,
};
pub use scaling::{
    ScalableEntry, ScalingEligibility, ScalingPolicy, ZonalScalableCatalog, ZonalScaling,
    ZoneScalable,
};
pub use shift::{NetworkShifter, NetworkShifting, ShiftOutcome, ShiftingConfig, ZoneScaling};
