//! Parallel per-direction orchestration of the SWE capacity computation.

pub mod config;
pub mod driver;
pub mod job;
pub mod manifest;
pub mod runner;

pub use config::SweConfig;
pub use driver::{ArtifactExporter, DichotomyDriver, VoltageMonitor};
pub use job::{DichotomyResult, DirectionTask, RunStatus, SweDichotomyResult, VoltageCheckResult};
pub use manifest::{load_swe_manifest, write_swe_manifest, SweManifest};
pub use runner::{SweOrchestrator, SweRunSummary};

pub use swe_algo::CancellationToken;
