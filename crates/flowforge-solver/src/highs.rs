//! HiGHS backend.

use ::highs::{HighsModelStatus, RowProblem, Sense as HighsSense};
use tracing::debug;

use flowforge_model::{Model, ObjectiveSense};

use crate::error::SolverError;
use crate::oracle::{SolveLimits, SolverOracle, SolverOutcome};

/// Largest violation accepted when reading a time-limited incumbent.
pub const INCUMBENT_TOLERANCE: f64 = 1e-5;

/// Solves models with the HiGHS MIP solver.
///
/// Each call builds a fresh row-wise problem, so one instance can serve
/// every scenario concurrently.
#[derive(Debug, Clone, Default)]
pub struct HighsSolver {
    verbose: bool,
}

impl HighsSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets HiGHS print its own log to stdout.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn problem(model: &Model) -> (RowProblem, HighsSense) {
        let mut costs = vec![0.0; model.num_variables()];
        for (var, coef) in model.objective().terms() {
            costs[var.index()] += coef;
        }

        let mut pb = RowProblem::default();
        let columns: Vec<_> = model
            .variables()
            .iter()
            .zip(costs)
            .map(|(v, cost)| {
                if v.domain.is_integral() {
                    pb.add_integer_column(cost, v.lower..=v.upper)
                } else {
                    pb.add_column(cost, v.lower..=v.upper)
                }
            })
            .collect();

        for c in model.constraints() {
            let (lower, upper) = c.bounds();
            let factors: Vec<_> = c
                .expr
                .terms()
                .map(|(var, coef)| (columns[var.index()], coef))
                .collect();
            pb.add_row(lower..=upper, factors);
        }

        let sense = match model.objective_sense() {
            ObjectiveSense::Minimize => HighsSense::Minimise,
            ObjectiveSense::Maximize => HighsSense::Maximise,
        };
        (pb, sense)
    }
}

impl SolverOracle for HighsSolver {
    fn name(&self) -> &str {
        "highs"
    }

    fn solve(&self, model: &Model, limits: &SolveLimits) -> Result<SolverOutcome, SolverError> {
        let (pb, sense) = Self::problem(model);
        let mut solver = pb.optimise(sense);
        if !self.verbose {
            solver.make_quiet();
        }
        solver.set_option("time_limit", limits.time_limit.as_secs_f64());
        solver.set_option("mip_rel_gap", limits.gap_limit);

        let solved = solver
            .try_solve()
            .map_err(|status| SolverError::Backend(format!("{status:?}")))?;
        let status = solved.status();
        debug!(event = "highs_status", status = ?status);

        let outcome = match status {
            HighsModelStatus::Optimal => {
                SolverOutcome::optimal(model, solved.get_solution().columns().to_vec())
            }
            HighsModelStatus::ModelEmpty => SolverOutcome::optimal(model, Vec::new()),
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                SolverOutcome::Infeasible
            }
            HighsModelStatus::Unbounded => SolverOutcome::Unbounded,
            HighsModelStatus::ReachedTimeLimit => {
                let values = solved.get_solution().columns().to_vec();
                if values.len() == model.num_variables()
                    && model.max_violation(&values) <= INCUMBENT_TOLERANCE
                {
                    SolverOutcome::time_limited(model, values)
                } else {
                    SolverOutcome::NoIncumbent
                }
            }
            other => {
                return Err(SolverError::Backend(format!(
                    "unexpected model status {other:?}"
                )))
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use flowforge_model::{Domain, LinearExpr, Sense};

    use super::*;

    fn limits() -> SolveLimits {
        SolveLimits::new(Duration::from_secs(10), 0.0)
    }

    #[test]
    fn test_small_mip_is_optimal() {
        let mut m = Model::new();
        let x = m.add_variable("x", Domain::Integer, 0.0, 10.0).unwrap();
        let y = m.add_variable("y", Domain::Continuous, 0.0, f64::INFINITY).unwrap();
        m.add_constraint("cover", LinearExpr::from(x) + y, Sense::Ge, 2.5)
            .unwrap();
        m.set_objective(
            LinearExpr::term(x, 1.0) + LinearExpr::term(y, 3.0),
            ObjectiveSense::Minimize,
        );

        let outcome = HighsSolver::new().solve(&m, &limits()).unwrap();
        let SolverOutcome::Optimal { values, objective } = outcome else {
            panic!("expected optimal, got {outcome:?}");
        };
        assert!((values[x.index()] - 3.0).abs() < 1e-6);
        assert!(values[y.index()].abs() < 1e-6);
        assert!((objective - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_objective_constant_is_reported() {
        let mut m = Model::new();
        let x = m.add_variable("x", Domain::Continuous, 1.0, 4.0).unwrap();
        m.set_objective(LinearExpr::from(x) + 7.0, ObjectiveSense::Maximize);

        match HighsSolver::new().solve(&m, &limits()).unwrap() {
            SolverOutcome::Optimal { objective, .. } => assert!((objective - 11.0).abs() < 1e-6),
            other => panic!("expected optimal, got {other:?}"),
        }
    }

    #[test]
    fn test_contradictory_rows_are_infeasible() {
        let mut m = Model::new();
        let x = m.add_variable("x", Domain::Binary, 0.0, 1.0).unwrap();
        m.add_constraint("high", LinearExpr::from(x), Sense::Ge, 0.6).unwrap();
        m.add_constraint("low", LinearExpr::from(x), Sense::Le, 0.4).unwrap();
        m.set_objective(LinearExpr::from(x), ObjectiveSense::Minimize);

        assert_eq!(
            HighsSolver::new().solve(&m, &limits()).unwrap(),
            SolverOutcome::Infeasible
        );
    }
}
