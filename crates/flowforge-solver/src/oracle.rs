//! The solver oracle seam.
//!
//! Everything above this trait is solver-agnostic. A backend receives a
//! fully assembled [`Model`] and reports one of the [`SolverOutcome`]s.

use std::time::Duration;

use flowforge_config::SolverSettings;
use flowforge_model::Model;

use crate::error::SolverError;

/// Limits applied to one oracle call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveLimits {
    pub time_limit: Duration,
    /// Relative MIP gap at which the backend may stop.
    pub gap_limit: f64,
}

impl SolveLimits {
    pub fn new(time_limit: Duration, gap_limit: f64) -> Self {
        Self {
            time_limit,
            gap_limit,
        }
    }
}

impl From<&SolverSettings> for SolveLimits {
    fn from(settings: &SolverSettings) -> Self {
        Self::new(settings.time_limit(), settings.gap_limit)
    }
}

/// What a backend returns for one model.
///
/// `values` is indexed by variable position in the model and `objective` is
/// the model's objective at those values.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome {
    Optimal { values: Vec<f64>, objective: f64 },
    /// The time limit expired with a feasible incumbent.
    TimeLimited { values: Vec<f64>, objective: f64 },
    /// The time limit expired before any feasible solution was found.
    NoIncumbent,
    Infeasible,
    Unbounded,
}

impl SolverOutcome {
    /// Builds an optimal outcome, evaluating the objective on `model`.
    pub fn optimal(model: &Model, values: Vec<f64>) -> Self {
        let objective = model.objective_value(&values);
        SolverOutcome::Optimal { values, objective }
    }

    /// Builds a time-limited outcome, evaluating the objective on `model`.
    pub fn time_limited(model: &Model, values: Vec<f64>) -> Self {
        let objective = model.objective_value(&values);
        SolverOutcome::TimeLimited { values, objective }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SolverOutcome::Optimal { .. } => "optimal",
            SolverOutcome::TimeLimited { .. } => "time_limited",
            SolverOutcome::NoIncumbent => "no_incumbent",
            SolverOutcome::Infeasible => "infeasible",
            SolverOutcome::Unbounded => "unbounded",
        }
    }

    /// The assignment, for outcomes that carry one.
    pub fn values(&self) -> Option<&[f64]> {
        match self {
            SolverOutcome::Optimal { values, .. } | SolverOutcome::TimeLimited { values, .. } => {
                Some(values)
            }
            _ => None,
        }
    }
}

/// An external LP/MILP solver.
///
/// Implementations must be shareable across threads: the orchestrator calls
/// one oracle from every scenario worker.
pub trait SolverOracle: Send + Sync {
    /// Backend name used in log events.
    fn name(&self) -> &str;

    /// Minimizes or maximizes the model's objective within `limits`.
    fn solve(&self, model: &Model, limits: &SolveLimits) -> Result<SolverOutcome, SolverError>;
}

impl<T: SolverOracle + ?Sized> SolverOracle for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, model: &Model, limits: &SolveLimits) -> Result<SolverOutcome, SolverError> {
        (**self).solve(model, limits)
    }
}
