//! Runs every scenario of an input through the staged solve.

use std::time::Instant;

use flowforge_config::FlowConfig;
use flowforge_core::{split_scenarios, InputTables, ScenarioData};
use flowforge_model::ModelBuilder;
use rayon::prelude::*;
use tracing::info;

use crate::error::{Result, ScenarioError};
use crate::oracle::{SolveLimits, SolverOracle};
use crate::result::{RunReport, ScenarioResult};
use crate::staged::StagedObjectiveHandler;
use crate::stats::RunStats;

/// Solves scenarios independently, in parallel when configured.
///
/// Each scenario is prepared, built and staged on its own; scenarios share
/// only the configuration and the oracle.
///
/// # Example
///
/// ```no_run
/// use flowforge_config::FlowConfig;
/// use flowforge_core::InputTables;
/// use flowforge_solver::{HighsSolver, SolveOrchestrator};
///
/// # fn tables() -> InputTables { InputTables::new() }
/// let orchestrator = SolveOrchestrator::new(FlowConfig::default(), HighsSolver::new());
/// let report = orchestrator.run(&tables()).unwrap();
/// for (name, result) in &report.scenarios {
///     println!("{name}: {}", if result.is_ok() { "solved" } else { "failed" });
/// }
/// ```
pub struct SolveOrchestrator<O> {
    config: FlowConfig,
    oracle: O,
}

impl<O: SolverOracle> SolveOrchestrator<O> {
    pub fn new(config: FlowConfig, oracle: O) -> Self {
        Self { config, oracle }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Splits `tables` into scenarios and solves each one.
    ///
    /// Only a failure to split is returned as an error; per-scenario
    /// failures are collected in the report.
    pub fn run(&self, tables: &InputTables) -> flowforge_core::Result<RunReport> {
        let scenarios = split_scenarios(tables)?;
        let mut stats = RunStats::default();
        stats.start();
        info!(
            event = "run_start",
            scenario_count = scenarios.len(),
            parallel = self.config.run.parallel_scenarios,
            oracle = self.oracle.name(),
        );

        let solve = |(name, tables): &(String, InputTables)| {
            (name.clone(), self.solve_scenario(name, tables))
        };
        let results: Vec<(String, Result<ScenarioResult>)> = if self.config.run.parallel_scenarios
        {
            scenarios.par_iter().map(solve).collect()
        } else {
            scenarios.iter().map(solve).collect()
        };

        for (_, result) in &results {
            stats.record_scenario(
                result.is_ok(),
                result.as_ref().map_or(0, |r| r.stages.len()),
            );
        }
        let duration_ms = stats.elapsed().as_millis() as u64;
        info!(
            event = "run_end",
            duration_ms = duration_ms,
            scenarios_solved = stats.scenarios_solved,
            scenarios_failed = stats.scenarios_failed,
            stages_solved = stats.stages_solved,
        );

        Ok(RunReport {
            scenarios: results,
            duration_ms,
        })
    }

    /// Prepares, builds and solves one scenario's tables.
    pub fn solve_scenario(&self, name: &str, tables: &InputTables) -> Result<ScenarioResult> {
        let start = Instant::now();
        info!(event = "scenario_start", scenario = name);
        let result = self.solve_prepared(name, tables);
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(r) => info!(
                event = "scenario_end",
                scenario = name,
                status = if r.optimal { "optimal" } else { "time_limited" },
                duration_ms = duration_ms,
                stages = r.stages.len(),
            ),
            Err(e) => info!(
                event = "scenario_end",
                scenario = name,
                status = "failed",
                duration_ms = duration_ms,
                error = %e,
            ),
        }
        result
    }

    fn solve_prepared(&self, name: &str, tables: &InputTables) -> Result<ScenarioResult> {
        let data = ScenarioData::prepare(name, tables)?;
        let config = self
            .config
            .with_parameters(
                data.records
                    .parameters
                    .iter()
                    .map(|p| (p.name.as_str(), p.value)),
            )
            .map_err(|e| ScenarioError::Settings(e.to_string()))?;

        let built = ModelBuilder::new(&data, &config.model).build()?;
        let outcome = StagedObjectiveHandler::new(
            &data.name,
            built.model,
            &built.vars,
            data.records.objectives.clone(),
            &self.oracle,
        )?
        .with_limits(SolveLimits::from(&config.solver))
        .with_freeze_tolerance(config.model.freeze_tolerance)
        .run()?;

        Ok(ScenarioResult::new(&data, &built.vars, outcome))
    }
}
