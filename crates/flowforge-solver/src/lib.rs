//! FlowForge Solver - staged multi-objective solving
//!
//! This crate takes built models to solved plans:
//! - The solver seam ([`SolverOracle`], [`SolverOutcome`], [`SolveLimits`])
//! - A HiGHS backend ([`HighsSolver`], `highs` feature, on by default)
//! - Prioritized objective stages with relaxed freezing ([`StagedObjectiveHandler`])
//! - Per-scenario orchestration, optionally parallel ([`SolveOrchestrator`])
//!
//! ## Logging
//!
//! - **INFO**: `run_start`, `scenario_start`, `stage_start`, `stage_end`,
//!   `scenario_end`, `run_end`
//! - **DEBUG**: `freeze` per relaxed bound added between stages
//! - **TRACE**: `oracle_call` before each solver invocation

pub mod error;
#[cfg(feature = "highs")]
pub mod highs;
pub mod oracle;
pub mod orchestrator;
pub mod result;
pub mod staged;
pub mod stats;

pub use error::{Result, ScenarioError, SolverError};
#[cfg(feature = "highs")]
pub use self::highs::HighsSolver;
pub use oracle::{SolveLimits, SolverOracle, SolverOutcome};
pub use orchestrator::SolveOrchestrator;
pub use result::{RunReport, ScenarioResult};
pub use staged::{StageRecord, StageState, StageStatus, StagedObjectiveHandler, StagedOutcome};
pub use stats::{RunStats, StageStats};
