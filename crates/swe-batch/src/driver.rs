//! Seams to the collaborators a direction run depends on.
//!
//! The bisection search, the voltage check and the result export are
//! provided by the caller; this crate only sequences them per direction.

use crate::job::{DichotomyResult, VoltageCheckResult};
use anyhow::Result;
use swe_algo::{CancellationToken, Direction, NetworkShifting};
use swe_core::{Grid, Network};

/// Searches the highest secure step of one direction.
///
/// The driver calls `shifter` once per trial step. Step failures such as
/// [`swe_algo::ShiftError::GlskLimitation`] mark the step as not reachable;
/// an interrupted shift should end the search early.
pub trait DichotomyDriver: Send + Sync {
    fn run(
        &self,
        direction: Direction,
        network: &mut Network,
        shifter: &dyn NetworkShifting,
        cancel: &CancellationToken,
    ) -> Result<DichotomyResult>;
}

pub trait VoltageMonitor: Send + Sync {
    fn check(&self, direction: Direction, grid: &Grid) -> Result<VoltageCheckResult>;
}

/// Writes the per-direction outputs and returns where they went.
pub trait ArtifactExporter: Send + Sync {
    fn export(
        &self,
        direction: Direction,
        network: &Network,
        result: &DichotomyResult,
    ) -> Result<Vec<String>>;
}
