//! Prioritized (lexicographic) objective solving.
//!
//! A scenario's objectives are solved one at a time in ascending priority.
//! After each stage its objective is frozen into the model as a relaxed
//! bound, so every later stage stays within the stage's relaxation of the
//! value it reached.
//!
//! ```text
//! Pending([p1, p2, ..]) --solve p1 ok--> freeze p1 --> Pending([p2, ..])
//! Pending([pn])         --solve pn ok--> Done
//! Pending([pk, ..])     --infeasible / unbounded / no incumbent--> Failed(pk)
//! ```

use std::collections::VecDeque;

use flowforge_core::records::check_priorities;
use flowforge_core::{ObjectiveKind, ObjectiveRecord};
use flowforge_model::{Model, ObjectiveSense, StageObjective, VariableSpace};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::{Result, ScenarioError};
use crate::oracle::{SolveLimits, SolverOracle, SolverOutcome};
use crate::stats::StageStats;

/// How a stage's assignment was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Optimal,
    /// Feasible incumbent returned at the time limit.
    TimeLimited,
}

impl StageStatus {
    pub fn name(self) -> &'static str {
        match self {
            StageStatus::Optimal => "optimal",
            StageStatus::TimeLimited => "time_limited",
        }
    }
}

/// The outcome of one solved stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub priority: i64,
    pub objective: ObjectiveKind,
    pub relaxation: f64,
    /// Objective value in its natural orientation.
    pub value: f64,
    pub status: StageStatus,
    pub duration_ms: u64,
}

/// Where a scenario's stage sequence stands.
#[derive(Debug, Clone, PartialEq)]
pub enum StageState {
    /// Objectives still to solve, lowest priority first.
    Pending(VecDeque<ObjectiveRecord>),
    Done,
    /// The stage with this priority failed; nothing after it ran.
    Failed(i64),
}

/// Everything a finished stage sequence produced.
#[derive(Debug, Clone)]
pub struct StagedOutcome {
    /// The model with every freeze row added.
    pub model: Model,
    /// Assignment of the last stage.
    pub values: Vec<f64>,
    pub stages: Vec<StageRecord>,
}

impl StagedOutcome {
    /// True when no stage stopped at the time limit.
    pub fn is_optimal(&self) -> bool {
        self.stages.iter().all(|s| s.status == StageStatus::Optimal)
    }
}

/// Drives one scenario's model through its objective stages.
///
/// The handler owns the model for the duration of the sequence; only
/// objective replacement and freeze rows touch it.
///
/// # Example
///
/// ```no_run
/// use flowforge_config::FlowConfig;
/// use flowforge_core::{InputTables, ScenarioData};
/// use flowforge_model::ModelBuilder;
/// use flowforge_solver::{HighsSolver, SolveLimits, StagedObjectiveHandler};
///
/// # fn tables() -> InputTables { InputTables::new() }
/// let config = FlowConfig::default();
/// let data = ScenarioData::prepare("Base", &tables()).unwrap();
/// let built = ModelBuilder::new(&data, &config.model).build().unwrap();
/// let oracle = HighsSolver::new();
/// let outcome = StagedObjectiveHandler::new(
///     "Base",
///     built.model,
///     &built.vars,
///     data.records.objectives.clone(),
///     &oracle,
/// )
/// .unwrap()
/// .with_limits(SolveLimits::from(&config.solver))
/// .run()
/// .unwrap();
/// println!("{} stages", outcome.stages.len());
/// ```
pub struct StagedObjectiveHandler<'a, O: SolverOracle + ?Sized> {
    scenario: &'a str,
    oracle: &'a O,
    vars: &'a VariableSpace,
    limits: SolveLimits,
    freeze_tolerance: f64,
    model: Model,
    state: StageState,
    stages: Vec<StageRecord>,
    values: Vec<f64>,
}

impl<'a, O: SolverOracle + ?Sized> StagedObjectiveHandler<'a, O> {
    /// Queues `objectives` in ascending priority.
    ///
    /// Fails when two objectives share a priority or the list is empty.
    pub fn new(
        scenario: &'a str,
        model: Model,
        vars: &'a VariableSpace,
        mut objectives: Vec<ObjectiveRecord>,
        oracle: &'a O,
    ) -> Result<Self> {
        check_priorities(scenario, &objectives)?;
        if objectives.is_empty() {
            return Err(ScenarioError::NoObjectives(scenario.to_string()));
        }
        objectives.sort_by_key(|o| o.priority);
        Ok(Self {
            scenario,
            oracle,
            vars,
            limits: SolveLimits::from(&flowforge_config::SolverSettings::default()),
            freeze_tolerance: flowforge_config::ModelSettings::default().freeze_tolerance,
            model,
            state: StageState::Pending(objectives.into()),
            stages: Vec::new(),
            values: Vec::new(),
        })
    }

    pub fn with_limits(mut self, limits: SolveLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Absolute slack added to every freeze bound.
    pub fn with_freeze_tolerance(mut self, tolerance: f64) -> Self {
        self.freeze_tolerance = tolerance;
        self
    }

    pub fn state(&self) -> &StageState {
        &self.state
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn stages(&self) -> &[StageRecord] {
        &self.stages
    }

    /// Solves the next pending stage. Does nothing once done or failed.
    pub fn step(&mut self) -> Result<()> {
        let popped = match &mut self.state {
            StageState::Pending(queue) => queue.pop_front().map(|next| (next, queue.len())),
            _ => return Ok(()),
        };
        let Some((next, remaining)) = popped else {
            self.state = StageState::Done;
            return Ok(());
        };

        let stage = StageObjective::new(next.objective, self.vars);
        let mut stats = StageStats::new(self.stages.len(), next.priority, next.objective.name());
        info!(
            event = "stage_start",
            scenario = self.scenario,
            priority = next.priority,
            objective = next.objective.name(),
            stage_index = stats.stage_index,
            relaxation = next.relaxation,
        );

        self.model
            .set_objective(stage.minimized(), ObjectiveSense::Minimize);
        trace!(
            event = "oracle_call",
            scenario = self.scenario,
            oracle = self.oracle.name(),
            variable_count = self.model.num_variables(),
            constraint_count = self.model.num_constraints(),
            time_limit_secs = self.limits.time_limit.as_secs_f64(),
            gap_limit = self.limits.gap_limit,
        );

        let outcome = match self.oracle.solve(&self.model, &self.limits) {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(&next, e.into())),
        };
        let (values, status) = match outcome {
            SolverOutcome::Optimal { values, .. } => (values, StageStatus::Optimal),
            SolverOutcome::TimeLimited { values, .. } => (values, StageStatus::TimeLimited),
            SolverOutcome::NoIncumbent => {
                let err = ScenarioError::NoIncumbent {
                    priority: next.priority,
                    objective: next.objective,
                };
                return Err(self.fail(&next, err));
            }
            SolverOutcome::Infeasible => {
                let err = ScenarioError::Infeasible {
                    priority: next.priority,
                    objective: next.objective,
                };
                return Err(self.fail(&next, err));
            }
            SolverOutcome::Unbounded => {
                let err = ScenarioError::Unbounded {
                    priority: next.priority,
                    objective: next.objective,
                };
                return Err(self.fail(&next, err));
            }
        };

        let value = stage.expr.evaluate(&values);
        if remaining > 0 {
            let (sense, bound) = stage.freeze_bound(value, next.relaxation, self.freeze_tolerance);
            let added = self.model.add_constraint(
                format!("freeze[{}]", next.priority),
                stage.expr.clone(),
                sense,
                bound,
            );
            if let Err(e) = added {
                return Err(self.fail(&next, e.into()));
            }
            stats.record_freeze();
            debug!(
                event = "freeze",
                scenario = self.scenario,
                priority = next.priority,
                objective = next.objective.name(),
                sense = %sense,
                bound = bound,
            );
        } else {
            self.state = StageState::Done;
        }

        info!(
            event = "stage_end",
            scenario = self.scenario,
            priority = next.priority,
            objective = next.objective.name(),
            stage_index = stats.stage_index,
            duration_ms = stats.elapsed_ms(),
            status = status.name(),
            value = value,
        );

        self.stages.push(StageRecord {
            priority: next.priority,
            objective: next.objective,
            relaxation: next.relaxation,
            value,
            status,
            duration_ms: stats.elapsed_ms(),
        });
        self.values = values;
        Ok(())
    }

    fn fail(&mut self, stage: &ObjectiveRecord, err: ScenarioError) -> ScenarioError {
        self.state = StageState::Failed(stage.priority);
        info!(
            event = "stage_end",
            scenario = self.scenario,
            priority = stage.priority,
            objective = stage.objective.name(),
            stage_index = self.stages.len(),
            status = "failed",
            error = %err,
        );
        err
    }

    /// Solves every pending stage in order.
    pub fn run(mut self) -> Result<StagedOutcome> {
        while matches!(self.state, StageState::Pending(_)) {
            self.step()?;
        }
        Ok(StagedOutcome {
            model: self.model,
            values: self.values,
            stages: self.stages,
        })
    }
}
