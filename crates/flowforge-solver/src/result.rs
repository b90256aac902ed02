//! Scenario results and run reports.

use std::collections::BTreeMap;

use flowforge_core::{NetworkSets, ObjectiveKind, ScenarioData};
use flowforge_model::{CostComponent, Model, VariableSpace};
use serde::Serialize;

use crate::error::ScenarioError;
use crate::staged::{StageRecord, StagedOutcome};

/// Values closer to zero than this are reported as exactly zero.
const ZERO_EPS: f64 = 1e-9;

fn clean(value: f64, integral: bool) -> f64 {
    let v = if integral { value.round() } else { value };
    if v.abs() < ZERO_EPS {
        0.0
    } else {
        v
    }
}

/// The solved plan of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub sets: NetworkSets,
    /// Every variable's value keyed by its model name, e.g.
    /// `flow[O,D,P,1,truck]`.
    pub values: BTreeMap<String, f64>,
    /// Value of each cost component keyed by component name.
    pub costs: BTreeMap<&'static str, f64>,
    pub stages: Vec<StageRecord>,
    /// False when any stage stopped at its time limit.
    pub optimal: bool,
    pub variable_count: usize,
    pub constraint_count: usize,
}

impl ScenarioResult {
    pub fn new(data: &ScenarioData, vars: &VariableSpace, outcome: StagedOutcome) -> Self {
        let values = named_values(&outcome.model, &outcome.values);
        let costs = CostComponent::ALL
            .into_iter()
            .filter_map(|c| {
                let id = vars.cost(c)?;
                let v = outcome.values.get(id.index()).copied().unwrap_or(0.0);
                Some((c.name(), clean(v, false)))
            })
            .collect();
        Self {
            scenario: data.name.clone(),
            sets: data.sets.clone(),
            values,
            costs,
            optimal: outcome.is_optimal(),
            variable_count: outcome.model.num_variables(),
            constraint_count: outcome.model.num_constraints(),
            stages: outcome.stages,
        }
    }

    /// Value of the named variable.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Sum of values over variables whose name starts with `prefix[`.
    pub fn total(&self, prefix: &str) -> f64 {
        let open = format!("{prefix}[");
        self.values
            .range(open.clone()..)
            .take_while(|(k, _)| k.starts_with(&open))
            .map(|(_, v)| v)
            .sum()
    }

    /// The stage that optimized `objective`, if it ran.
    pub fn stage(&self, objective: ObjectiveKind) -> Option<&StageRecord> {
        self.stages.iter().find(|s| s.objective == objective)
    }

    pub fn total_cost(&self) -> f64 {
        self.costs.values().sum()
    }
}

fn named_values(model: &Model, values: &[f64]) -> BTreeMap<String, f64> {
    model
        .variables()
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = values.get(i).copied().unwrap_or(0.0);
            (v.name.clone(), clean(x, v.domain.is_integral()))
        })
        .collect()
}

/// Results of every scenario in one run, in scenario order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub scenarios: Vec<(String, Result<ScenarioResult, ScenarioError>)>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn get(&self, scenario: &str) -> Option<&Result<ScenarioResult, ScenarioError>> {
        self.scenarios
            .iter()
            .find(|(name, _)| name == scenario)
            .map(|(_, r)| r)
    }

    /// Successful scenario results.
    pub fn solved(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.scenarios.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    /// Failed scenarios with their errors.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &ScenarioError)> {
        self.scenarios
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)))
    }

    pub fn is_success(&self) -> bool {
        self.scenarios.iter().all(|(_, r)| r.is_ok())
    }
}
