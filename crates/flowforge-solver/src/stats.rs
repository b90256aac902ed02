//! Run and stage statistics.

use std::time::{Duration, Instant};

/// Run-level statistics.
///
/// Aggregates scenario and stage counts across one orchestrator run.
///
/// # Example
///
/// ```
/// use flowforge_solver::stats::RunStats;
///
/// let mut stats = RunStats::default();
/// stats.start();
/// stats.record_scenario(true, 2);
/// stats.record_scenario(false, 1);
///
/// assert_eq!(stats.scenarios_solved, 1);
/// assert_eq!(stats.scenarios_failed, 1);
/// assert_eq!(stats.stages_solved, 3);
/// ```
#[derive(Debug, Default)]
pub struct RunStats {
    start_time: Option<Instant>,
    pub scenarios_solved: u64,
    pub scenarios_failed: u64,
    /// Stages that returned a usable assignment, in any scenario.
    pub stages_solved: u64,
}

impl RunStats {
    /// Marks the start of the run.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Returns the elapsed time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Records a finished scenario and the stages it solved.
    pub fn record_scenario(&mut self, solved: bool, stages: usize) {
        if solved {
            self.scenarios_solved += 1;
        } else {
            self.scenarios_failed += 1;
        }
        self.stages_solved += stages as u64;
    }

    pub fn scenario_count(&self) -> u64 {
        self.scenarios_solved + self.scenarios_failed
    }
}

/// Statistics of one objective stage.
///
/// # Example
///
/// ```
/// use flowforge_solver::stats::StageStats;
///
/// let mut stats = StageStats::new(0, 1, "Minimize Cost");
/// stats.record_freeze();
///
/// assert_eq!(stats.stage_index, 0);
/// assert_eq!(stats.priority, 1);
/// assert_eq!(stats.frozen_rows, 1);
/// ```
#[derive(Debug)]
pub struct StageStats {
    /// Position of the stage in the scenario (0-based).
    pub stage_index: usize,
    pub priority: i64,
    pub objective: &'static str,
    start_time: Instant,
    /// Freeze rows this stage added for later stages.
    pub frozen_rows: u64,
}

impl StageStats {
    pub fn new(stage_index: usize, priority: i64, objective: &'static str) -> Self {
        Self {
            stage_index,
            priority,
            objective,
            start_time: Instant::now(),
            frozen_rows: 0,
        }
    }

    /// Returns the elapsed time for this stage.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    pub fn record_freeze(&mut self) {
        self.frozen_rows += 1;
    }
}
