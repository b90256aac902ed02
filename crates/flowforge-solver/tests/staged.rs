//! Stage sequencing against a scripted oracle.

use std::time::Duration;

use flowforge_config::ModelSettings;
use flowforge_core::{split_scenarios, ConfigError, InputTables, ObjectiveKind, ScenarioData};
use flowforge_model::{BuiltModel, Model, ModelBuilder, Sense};
use flowforge_solver::{
    ScenarioError, SolveLimits, SolverOutcome, StageState, StageStatus, StagedObjectiveHandler,
};
use flowforge_test::network::{base_network, scenario_a, scenario_c, with_objectives, FLOW_VAR};
use flowforge_test::{assign, ScriptedOracle};

fn build(tables: &InputTables) -> (ScenarioData, BuiltModel) {
    let (name, split) = split_scenarios(tables).unwrap().remove(0);
    let data = ScenarioData::prepare(&name, &split).unwrap();
    let built = ModelBuilder::new(&data, &ModelSettings::default())
        .build()
        .unwrap();
    (data, built)
}

fn cost_plan(model: &Model) -> SolverOutcome {
    SolverOutcome::optimal(
        model,
        assign(model, &[(FLOW_VAR, 100.0), ("cost[transportation]", 100.0)]),
    )
}

fn handler<'a>(
    data: &'a ScenarioData,
    built: &'a BuiltModel,
    oracle: &'a ScriptedOracle,
) -> StagedObjectiveHandler<'a, ScriptedOracle> {
    StagedObjectiveHandler::new(
        &data.name,
        built.model.clone(),
        &built.vars,
        data.records.objectives.clone(),
        oracle,
    )
    .unwrap()
}

#[test]
fn test_single_stage_adds_no_freeze() {
    let (data, built) = build(&scenario_a());
    let oracle = ScriptedOracle::new().then(cost_plan);

    let outcome = handler(&data, &built, &oracle).run().unwrap();

    assert_eq!(oracle.calls(), 1);
    assert_eq!(outcome.stages.len(), 1);
    assert_eq!(outcome.stages[0].value, 100.0);
    assert_eq!(outcome.stages[0].status, StageStatus::Optimal);
    assert!(outcome.model.constraint("freeze[1]").is_none());
    assert!(outcome.is_optimal());
}

#[test]
fn test_relaxed_freeze_reaches_next_stage() {
    let (data, built) = build(&scenario_c());
    let oracle = ScriptedOracle::new().then(cost_plan).then(cost_plan);

    let outcome = handler(&data, &built, &oracle).run().unwrap();
    assert_eq!(outcome.stages.len(), 2);

    let models = oracle.models();
    assert!(models[0].constraint("freeze[1]").is_none());
    let freeze = models[1].constraint("freeze[1]").unwrap();
    assert_eq!(freeze.sense, Sense::Le);
    assert!((freeze.rhs - 110.0).abs() < 1e-3);

    let distance = models[1].var("kpi[max_transit_distance]").unwrap();
    assert_eq!(models[1].objective().coefficient(distance), 1.0);
}

#[test]
fn test_zero_relaxation_keeps_first_value() {
    let tables = with_objectives(
        base_network(150.0),
        "Z",
        &[(1, "Minimize Cost", 0.0), (2, "Minimize Dropped Volume", 0.0)],
    );
    let (data, built) = build(&tables);
    let oracle = ScriptedOracle::new().then(cost_plan).then(cost_plan);

    handler(&data, &built, &oracle).run().unwrap();

    let freeze = oracle.models()[1].constraint("freeze[1]").cloned().unwrap();
    assert!(freeze.rhs >= 100.0);
    assert!(freeze.rhs - 100.0 < 1e-3);
}

#[test]
fn test_maximize_is_minimized_negation_and_freezes_from_below() {
    let tables = with_objectives(
        base_network(150.0),
        "M",
        &[(1, "Maximize Capacity", 0.2), (2, "Minimize Cost", 0.0)],
    );
    let (data, built) = build(&tables);
    let oracle = ScriptedOracle::new()
        .then(|m| SolverOutcome::optimal(m, assign(m, &[("kpi[total_delivered]", 100.0)])))
        .then(cost_plan);

    let outcome = handler(&data, &built, &oracle).run().unwrap();
    assert_eq!(outcome.stages[0].value, 100.0);

    let models = oracle.models();
    let delivered = models[0].var("kpi[total_delivered]").unwrap();
    assert_eq!(models[0].objective().coefficient(delivered), -1.0);

    let freeze = models[1].constraint("freeze[1]").unwrap();
    assert_eq!(freeze.sense, Sense::Ge);
    assert!((freeze.rhs - 80.0).abs() < 1e-3);
}

#[test]
fn test_infeasible_stage_fails_and_stops() {
    let (data, built) = build(&scenario_c());
    let oracle = ScriptedOracle::new()
        .then_outcome(SolverOutcome::Infeasible)
        .then(cost_plan);

    let mut h = handler(&data, &built, &oracle);
    let err = h.step().unwrap_err();
    assert_eq!(
        err,
        ScenarioError::Infeasible {
            priority: 1,
            objective: ObjectiveKind::MinimizeCost,
        }
    );
    assert_eq!(h.state(), &StageState::Failed(1));

    h.step().unwrap();
    assert_eq!(oracle.calls(), 1);
}

#[test]
fn test_second_stage_failure_names_its_priority() {
    let (data, built) = build(&scenario_c());
    let oracle = ScriptedOracle::new()
        .then(cost_plan)
        .then_outcome(SolverOutcome::Unbounded);

    let err = handler(&data, &built, &oracle).run().unwrap_err();
    assert_eq!(err.failed_priority(), Some(2));
    assert!(matches!(err, ScenarioError::Unbounded { .. }));
}

#[test]
fn test_time_limit_without_incumbent_fails() {
    let (data, built) = build(&scenario_a());
    let oracle = ScriptedOracle::new().then_outcome(SolverOutcome::NoIncumbent);

    let err = handler(&data, &built, &oracle).run().unwrap_err();
    assert!(matches!(err, ScenarioError::NoIncumbent { priority: 1, .. }));
}

#[test]
fn test_time_limited_incumbent_is_flagged() {
    let (data, built) = build(&scenario_a());
    let oracle = ScriptedOracle::new().then(|m| {
        SolverOutcome::time_limited(m, assign(m, &[("cost[transportation]", 120.0)]))
    });

    let outcome = handler(&data, &built, &oracle).run().unwrap();
    assert_eq!(outcome.stages[0].status, StageStatus::TimeLimited);
    assert_eq!(outcome.stages[0].value, 120.0);
    assert!(!outcome.is_optimal());
}

#[test]
fn test_tied_priorities_are_rejected() {
    let (data, built) = build(&scenario_c());
    let mut objectives = data.records.objectives.clone();
    objectives[1].priority = objectives[0].priority;
    let oracle = ScriptedOracle::new();

    let err = StagedObjectiveHandler::new("C", built.model.clone(), &built.vars, objectives, &oracle)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ScenarioError::Config(ConfigError::DuplicatePriority { priority: 1, .. })
    ));
}

#[test]
fn test_empty_objectives_are_rejected() {
    let (_, built) = build(&scenario_a());
    let oracle = ScriptedOracle::new();
    let err = StagedObjectiveHandler::new("A", built.model.clone(), &built.vars, Vec::new(), &oracle)
        .err()
        .unwrap();
    assert_eq!(err, ScenarioError::NoObjectives("A".to_string()));
}

#[test]
fn test_limits_reach_the_oracle() {
    let (data, built) = build(&scenario_a());
    let oracle = ScriptedOracle::new().then(cost_plan);
    let limits = SolveLimits::new(Duration::from_secs(5), 0.05);

    handler(&data, &built, &oracle)
        .with_limits(limits)
        .run()
        .unwrap();
    assert_eq!(oracle.limits(), vec![limits]);
}

#[test]
fn test_exhausted_script_is_a_backend_error() {
    let (data, built) = build(&scenario_a());
    let oracle = ScriptedOracle::new();
    let err = handler(&data, &built, &oracle).run().unwrap_err();
    assert!(matches!(err, ScenarioError::Solver(_)));
}
