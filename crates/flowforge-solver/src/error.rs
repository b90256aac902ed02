//! Error types for solving.

use flowforge_core::{ConfigError, ObjectiveKind};
use flowforge_model::ModelError;
use thiserror::Error;

/// Failures of the solver backend itself, as opposed to model outcomes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("solver backend failed: {0}")]
    Backend(String),
}

/// Why a scenario produced no result.
///
/// Stage failures carry the priority and objective that failed; the stages
/// before it were solved but their values are not reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    /// Invalid input tables.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Scenario parameters produced invalid run settings.
    #[error("invalid scenario settings: {0}")]
    Settings(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// The scenario declares no objective to optimize.
    #[error("scenario '{0}' has no objectives")]
    NoObjectives(String),

    #[error("stage {priority} ({objective}) is infeasible")]
    Infeasible {
        priority: i64,
        objective: ObjectiveKind,
    },

    #[error("stage {priority} ({objective}) is unbounded")]
    Unbounded {
        priority: i64,
        objective: ObjectiveKind,
    },

    /// The time limit expired before any feasible solution was found.
    #[error("stage {priority} ({objective}) hit the time limit without a feasible solution")]
    NoIncumbent {
        priority: i64,
        objective: ObjectiveKind,
    },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl ScenarioError {
    /// The priority of the failing stage, for stage failures.
    pub fn failed_priority(&self) -> Option<i64> {
        match self {
            ScenarioError::Infeasible { priority, .. }
            | ScenarioError::Unbounded { priority, .. }
            | ScenarioError::NoIncumbent { priority, .. } => Some(*priority),
            _ => None,
        }
    }
}

/// Result type alias for scenario solving.
pub type Result<T> = std::result::Result<T, ScenarioError>;
