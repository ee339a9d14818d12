//! Error types for shifting and HVDC rewriting.
//!
//! [`ShiftError`] is what the bisection driver sees for one trial step.
//! [`ShiftError::kind`] groups variants into the categories the driver and
//! the orchestrator branch on; none of them is retried inside the engine.

use crate::exchange::BorderExchanges;
use serde::Serialize;
use swe_core::{BranchId, GenId, SweError, Zone};
use thiserror::Error;

/// Requested versus realized delta of a zone that could not be scaled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitingZone {
    pub zone: Zone,
    pub requested: f64,
    pub realized: f64,
}

impl std::fmt::Display for LimitingZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (asked {:.1} MW, realized {:.1} MW)",
            self.zone, self.requested, self.realized
        )
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum ShiftError {
    /// A zone cannot realize its planned delta.
    #[error("GLSK limitation in zone(s): {}", join(.zones))]
    GlskLimitation { zones: Vec<LimitingZone> },

    /// Iteration bound reached with border exchanges still out of tolerance.
    #[error("balancing did not converge after {iterations} iteration(s); last exchanges: {exchanges}")]
    BalanceTolerance {
        iterations: usize,
        exchanges: BorderExchanges,
    },

    #[error("{kind} '{id}' not found in network")]
    MissingElement { kind: &'static str, id: String },

    /// A generator outside the main component hangs on several transformers.
    #[error("generator '{generator}' is linked to the main component by {} transformers ({})", .transformers.len(), join(.transformers))]
    AmbiguousTransformerLink {
        generator: GenId,
        transformers: Vec<BranchId>,
    },

    #[error("terminal bus of generator '{generator}' cannot be resolved")]
    UnresolvedTerminalBus { generator: GenId },

    #[error("shift interrupted")]
    Interrupted,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Grid(#[from] SweError),
}

/// Failure categories, in the terms the bisection driver reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    CapacityExhaustion,
    BalancingTolerance,
    DataValidity,
    Interrupted,
    Infrastructure,
}

impl ShiftError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShiftError::GlskLimitation { .. } => ErrorKind::CapacityExhaustion,
            ShiftError::BalanceTolerance { .. } => ErrorKind::BalancingTolerance,
            ShiftError::MissingElement { .. }
            | ShiftError::AmbiguousTransformerLink { .. }
            | ShiftError::UnresolvedTerminalBus { .. }
            | ShiftError::Config(_) => ErrorKind::DataValidity,
            ShiftError::Interrupted => ErrorKind::Interrupted,
            ShiftError::Grid(_) => ErrorKind::Infrastructure,
        }
    }

    /// Step-level failures: the driver may treat the step as not evaluable
    /// and keep searching. Everything else ends the direction's run.
    pub fn is_step_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CapacityExhaustion | ErrorKind::BalancingTolerance
        )
    }

    /// Shifting is deterministic on a given grid, so no error clears on
    /// retry.
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub(crate) fn missing(kind: &'static str, id: impl ToString) -> Self {
        ShiftError::MissingElement {
            kind,
            id: id.to_string(),
        }
    }
}

pub type ShiftResult<T> = Result<T, ShiftError>;

#[derive(Error, Debug)]
pub enum HvdcError {
    #[error("{kind} '{id}' referenced by HVDC parameters '{hvdc}' not found in network")]
    MissingElement {
        hvdc: String,
        kind: &'static str,
        id: String,
    },

    #[error("invalid HVDC creation parameters: {0}")]
    Parameters(String),

    #[error(transparent)]
    Grid(#[from] SweError),
}

pub type HvdcResult<T> = Result<T, HvdcError>;
