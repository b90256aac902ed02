//! A solver oracle that replays scripted answers.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use flowforge_model::Model;
use flowforge_solver::{SolveLimits, SolverError, SolverOracle, SolverOutcome};

type Script = Box<dyn Fn(&Model) -> SolverOutcome + Send + Sync>;

/// Returns queued outcomes in order and records every model it receives.
///
/// Steps are closures over the received model, so a script can size its
/// assignment to whatever the builder declared. Calls past the end of the
/// script fail with a backend error.
///
/// ```ignore
/// let oracle = ScriptedOracle::new()
///     .then(|m| SolverOutcome::optimal(m, assign(m, &[("flow[O,D,P,1,truck]", 100.0)])))
///     .then_outcome(SolverOutcome::Infeasible);
/// ```
#[derive(Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Script>>,
    received: Mutex<Vec<(Model, SolveLimits)>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step computed from the received model.
    pub fn then(self, step: impl Fn(&Model) -> SolverOutcome + Send + Sync + 'static) -> Self {
        lock(&self.script).push_back(Box::new(step));
        self
    }

    /// Appends a fixed outcome.
    pub fn then_outcome(self, outcome: SolverOutcome) -> Self {
        self.then(move |_| outcome.clone())
    }

    /// Models received so far, in call order.
    pub fn models(&self) -> Vec<Model> {
        lock(&self.received).iter().map(|(m, _)| m.clone()).collect()
    }

    /// Limits received so far, in call order.
    pub fn limits(&self) -> Vec<SolveLimits> {
        lock(&self.received).iter().map(|(_, l)| *l).collect()
    }

    pub fn calls(&self) -> usize {
        lock(&self.received).len()
    }
}

impl SolverOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve(&self, model: &Model, limits: &SolveLimits) -> Result<SolverOutcome, SolverError> {
        lock(&self.received).push((model.clone(), *limits));
        let step = lock(&self.script)
            .pop_front()
            .ok_or_else(|| SolverError::Backend("script exhausted".to_string()))?;
        Ok(step(model))
    }
}

/// A zero assignment for `model` with the named variables set.
///
/// Unknown names are ignored.
pub fn assign(model: &Model, values: &[(&str, f64)]) -> Vec<f64> {
    let mut out = vec![0.0; model.num_variables()];
    for (name, value) in values {
        if let Some(id) = model.var(name) {
            out[id.index()] = *value;
        }
    }
    out
}
