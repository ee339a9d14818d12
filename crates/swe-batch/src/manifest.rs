use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use swe_algo::ProcessType;

use crate::job::{RunStatus, SweDichotomyResult};

/// Run record written next to the direction outputs.
#[derive(Debug, Serialize, Deserialize)]
pub struct SweManifest {
    pub created_at: DateTime<Utc>,
    pub process: ProcessType,
    pub num_directions: usize,
    pub completed: usize,
    pub interrupted: usize,
    pub rao_failed: usize,
    pub run_failed: usize,
    pub directions: Vec<SweDichotomyResult>,
}

impl SweManifest {
    pub fn from_results(process: ProcessType, results: &[SweDichotomyResult]) -> Self {
        let count = |status: RunStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            created_at: Utc::now(),
            process,
            num_directions: results.len(),
            completed: count(RunStatus::Completed),
            interrupted: count(RunStatus::Interrupted),
            rao_failed: count(RunStatus::RaoFailed),
            run_failed: count(RunStatus::RunFailed),
            directions: results.to_vec(),
        }
    }
}

pub fn write_swe_manifest(path: &Path, manifest: &SweManifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating manifest directory '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(manifest).context("serializing SWE manifest to JSON")?;
    fs::write(path, json).with_context(|| format!("writing SWE manifest '{}'", path.display()))?;
    Ok(())
}

pub fn load_swe_manifest(path: &Path) -> Result<SweManifest> {
    let file = fs::File::open(path)
        .with_context(|| format!("opening SWE manifest '{}'", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("parsing SWE manifest '{}'", path.display()))
}
