//! FlowForge - supply-chain network optimization
//!
//! Feed it input tables describing a network (nodes, products, lanes,
//! demand, capacities, costs) plus a prioritized list of objectives, and it
//! returns one solved plan per scenario.
//!
//! # Example
//!
//! ```no_run
//! use flowforge::prelude::*;
//!
//! let json = std::fs::read_to_string("network.json").unwrap();
//! let report = flowforge::solve_json(&json).unwrap();
//! for result in report.solved() {
//!     println!("{}: total cost {}", result.scenario, result.total_cost());
//! }
//! ```
//!
//! Enable the `console` feature for colored progress output of runs,
//! scenarios and objective stages.

use flowforge_solver::SolveOrchestrator;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "console")]
pub mod console;

// Input handling
pub use flowforge_core::{
    row, Cell, InputTables, NetworkSets, ObjectiveKind, ObjectiveRecord, Row, ScenarioData, Table,
};

// Configuration
pub use flowforge_config::{FlowConfig, ModelSettings, RunSettings, SolverSettings};

// Model building
pub use flowforge_model::{BuiltModel, Model, ModelBuilder, Sense};

// Solving
pub use flowforge_solver::{
    RunReport, ScenarioError, ScenarioResult, SolveLimits, SolverError, SolverOracle,
    SolverOutcome, StageRecord, StageStatus, StagedObjectiveHandler,
};
#[cfg(feature = "highs")]
pub use flowforge_solver::HighsSolver;

/// Default configuration file looked up by [`solve_json`].
pub const CONFIG_FILE: &str = "flowforge.toml";

/// Errors surfaced by the top-level entry points.
#[derive(Debug, Error)]
pub enum FlowForgeError {
    /// The input tables are malformed or have no scenarios.
    #[error("input error: {0}")]
    Input(#[from] flowforge_core::ConfigError),

    /// The configuration file could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] flowforge_config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A single scenario failed; only raised by [`solve_scenario`].
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

pub type Result<T> = std::result::Result<T, FlowForgeError>;

/// Solves every scenario of `tables` with a caller-supplied oracle.
pub fn solve_with<O: SolverOracle>(
    tables: &InputTables,
    config: FlowConfig,
    oracle: O,
) -> Result<RunReport> {
    config.validate()?;
    Ok(SolveOrchestrator::new(config, oracle).run(tables)?)
}

/// Solves every scenario of `tables` with HiGHS.
#[cfg(feature = "highs")]
pub fn solve(tables: &InputTables, config: FlowConfig) -> Result<RunReport> {
    solve_with(tables, config, HighsSolver::new())
}

/// Solves the single scenario named `scenario`.
#[cfg(feature = "highs")]
pub fn solve_scenario(
    tables: &InputTables,
    scenario: &str,
    config: FlowConfig,
) -> Result<ScenarioResult> {
    config.validate()?;
    let orchestrator = SolveOrchestrator::new(config, HighsSolver::new());
    let split = flowforge_core::split_scenarios(tables)?;
    let (name, scenario_tables) = split
        .iter()
        .find(|(name, _)| name == scenario)
        .ok_or_else(|| flowforge_core::ConfigError::UnknownMember {
            table: "Scenarios".to_string(),
            set: "scenario",
            value: scenario.to_string(),
        })?;
    Ok(orchestrator.solve_scenario(name, scenario_tables)?)
}

/// Parses JSON tables and solves them with HiGHS.
///
/// Configuration is read from [`CONFIG_FILE`] when present, defaults
/// otherwise.
#[cfg(feature = "highs")]
pub fn solve_json(json: &str) -> Result<RunReport> {
    #[cfg(feature = "console")]
    console::init();

    let tables = InputTables::from_json_str(json)?;
    let config = match FlowConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            debug!(event = "config_default", path = CONFIG_FILE, error = %e);
            FlowConfig::default()
        }
    };
    solve(&tables, config)
}

/// Renders a run report as JSON.
///
/// Solved scenarios serialize their full result; failed ones carry the
/// error message and, for stage failures, the failing priority.
pub fn report_to_json(report: &RunReport) -> Result<Value> {
    let mut scenarios = serde_json::Map::new();
    for (name, result) in &report.scenarios {
        let entry = match result {
            Ok(r) => serde_json::to_value(r)?,
            Err(e) => json!({
                "error": e.to_string(),
                "failed_priority": e.failed_priority(),
            }),
        };
        scenarios.insert(name.clone(), entry);
    }
    Ok(json!({
        "duration_ms": report.duration_ms,
        "scenarios": scenarios,
    }))
}

pub mod prelude {
    pub use super::{
        report_to_json, row, solve_with, FlowConfig, FlowForgeError, InputTables, ObjectiveKind,
        RunReport, ScenarioError, ScenarioResult, SolverOracle,
    };
    #[cfg(feature = "highs")]
    pub use super::{solve, solve_json, HighsSolver};
}
