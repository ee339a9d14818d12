use serde::{Deserialize, Serialize};
use swe_algo::Direction;
use swe_core::Network;

/// One direction to compute, with the network it owns for the run.
#[derive(Debug, Clone)]
pub struct DirectionTask {
    pub direction: Direction,
    pub network: Network,
}

impl DirectionTask {
    pub fn new(direction: Direction, network: Network) -> Self {
        Self { direction, network }
    }

    /// One task per direction, each on its own copy of `network`.
    pub fn all_directions(network: &Network) -> Vec<Self> {
        Direction::ALL
            .into_iter()
            .map(|direction| Self::new(direction, network.clone()))
            .collect()
    }
}

/// What the bisection driver found for one direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DichotomyResult {
    /// Highest step that was shifted and found secure
    pub highest_valid_step: Option<f64>,
    /// Lowest step that failed, if any
    pub lowest_invalid_step: Option<f64>,
    #[serde(default)]
    pub limiting_cause: Option<String>,
    #[serde(default)]
    pub rao_failed: bool,
    #[serde(default)]
    pub interrupted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoltageCheckResult {
    pub secure: bool,
    #[serde(default)]
    pub violations: Vec<String>,
}

/// Outcome class of a direction. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Interrupted,
    RaoFailed,
    RunFailed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Interrupted => "interrupted",
            RunStatus::RaoFailed => "rao_failed",
            RunStatus::RunFailed => "run_failed",
        }
    }
}

/// Folded result of one direction: dichotomy, voltage check, exported
/// artifacts and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweDichotomyResult {
    pub direction: Direction,
    pub status: RunStatus,
    pub dichotomy: Option<DichotomyResult>,
    pub voltage_check: Option<VoltageCheckResult>,
    #[serde(default)]
    pub artifacts: Vec<String>,
    pub error: Option<String>,
}

impl SweDichotomyResult {
    fn bare(direction: Direction, status: RunStatus) -> Self {
        Self {
            direction,
            status,
            dichotomy: None,
            voltage_check: None,
            artifacts: Vec::new(),
            error: None,
        }
    }

    pub fn interrupted(direction: Direction) -> Self {
        Self::bare(direction, RunStatus::Interrupted)
    }

    pub fn run_failed(direction: Direction, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::bare(direction, RunStatus::RunFailed)
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.status == RunStatus::Interrupted
    }

    pub fn is_rao_failed(&self) -> bool {
        self.status == RunStatus::RaoFailed
    }

    pub fn is_run_failed(&self) -> bool {
        self.status == RunStatus::RunFailed
    }
}
