use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use swe_algo::{ProcessType, ShiftingConfig};
use swe_core::SolverKind;

/// Run configuration, read from TOML.
///
/// ```toml
/// process = "idcc"
/// threads = 4
/// solver = "faer"
/// output_root = "out"
///
/// [shifting]
/// max_iterations = 6
/// tolerance_es_pt_mw = 5.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweConfig {
    pub process: ProcessType,
    /// Worker threads; 0 uses every core
    pub threads: usize,
    pub solver: SolverKind,
    pub output_root: Option<PathBuf>,
    pub shifting: ShiftingConfig,
}

impl SweConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing SWE configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in '{}'", path.display()))
    }
}
