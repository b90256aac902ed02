//! Scenario orchestration against a scripted oracle.

use std::time::Duration;

use flowforge_config::FlowConfig;
use flowforge_core::{row, ConfigError};
use flowforge_model::Model;
use flowforge_solver::{ScenarioError, SolveOrchestrator, SolverOutcome};
use flowforge_test::network::{scenario_a, scenarios_a_and_b, FLOW_VAR};
use flowforge_test::{assign, ScriptedOracle};

fn shipped(model: &Model) -> SolverOutcome {
    SolverOutcome::optimal(
        model,
        assign(model, &[(FLOW_VAR, 100.0), ("cost[transportation]", 100.0)]),
    )
}

fn sequential() -> FlowConfig {
    FlowConfig::default().with_parallel_scenarios(false)
}

#[test]
fn test_every_scenario_is_reported_in_order() {
    let oracle = ScriptedOracle::new().then(shipped).then(shipped);
    let orchestrator = SolveOrchestrator::new(FlowConfig::default(), oracle);

    let report = orchestrator.run(&scenarios_a_and_b()).unwrap();

    let names: Vec<&str> = report.scenarios.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert!(report.is_success());
    assert_eq!(orchestrator.oracle().calls(), 2);
}

#[test]
fn test_failed_scenario_leaves_others_untouched() {
    let oracle = ScriptedOracle::new()
        .then_outcome(SolverOutcome::Infeasible)
        .then(shipped);
    let orchestrator = SolveOrchestrator::new(sequential(), oracle);

    let report = orchestrator.run(&scenarios_a_and_b()).unwrap();

    assert!(matches!(
        report.get("A"),
        Some(Err(ScenarioError::Infeasible { priority: 1, .. }))
    ));
    let b = report.get("B").unwrap().as_ref().unwrap();
    assert_eq!(b.value(FLOW_VAR), Some(100.0));
    assert_eq!(report.failed().count(), 1);
    assert_eq!(report.solved().count(), 1);
}

#[test]
fn test_result_carries_values_costs_and_sets() {
    let oracle = ScriptedOracle::new().then(shipped);
    let orchestrator = SolveOrchestrator::new(sequential(), oracle);

    let report = orchestrator.run(&scenario_a()).unwrap();
    let result = report.get("A").unwrap().as_ref().unwrap();

    assert_eq!(result.scenario, "A");
    assert_eq!(result.value(FLOW_VAR), Some(100.0));
    assert_eq!(result.costs.get("transportation"), Some(&100.0));
    assert_eq!(result.total_cost(), 100.0);
    assert!(result.sets.nodes.contains("O"));
    assert!(result.optimal);
    assert_eq!(result.variable_count, result.values.len());

    let json = serde_json::to_value(result).unwrap();
    assert_eq!(json["scenario"], "A");
    assert_eq!(json["stages"][0]["objective"], "MinimizeCost");
}

#[test]
fn test_scenario_parameters_override_limits() {
    let tables = scenario_a().with_table(
        "Parameters",
        vec![
            row! { "Parameter" => "Max Run Time", "Value" => 30.0 },
            row! { "Parameter" => "Gap Limit", "Value" => 0.05 },
        ],
    );
    let oracle = ScriptedOracle::new().then(shipped);
    let orchestrator = SolveOrchestrator::new(sequential(), oracle);

    orchestrator.run(&tables).unwrap();

    let limits = orchestrator.oracle().limits();
    assert_eq!(limits[0].time_limit, Duration::from_secs(30));
    assert_eq!(limits[0].gap_limit, 0.05);
}

#[test]
fn test_invalid_parameter_is_a_settings_error() {
    let tables = scenario_a().with_table(
        "Parameters",
        vec![row! { "Parameter" => "Gap Limit", "Value" => 2.0 }],
    );
    let orchestrator = SolveOrchestrator::new(sequential(), ScriptedOracle::new());

    let report = orchestrator.run(&tables).unwrap();
    assert!(matches!(report.get("A"), Some(Err(ScenarioError::Settings(_)))));
    assert_eq!(orchestrator.oracle().calls(), 0);
}

#[test]
fn test_bad_input_fails_before_solving() {
    let tables = scenario_a().with_table(
        "Demand",
        vec![row! { "Period" => 1, "Product" => "P", "Destination" => "Nowhere", "Demand" => 5.0 }],
    );
    let orchestrator = SolveOrchestrator::new(sequential(), ScriptedOracle::new());

    let report = orchestrator.run(&tables).unwrap();
    assert!(matches!(
        report.get("A"),
        Some(Err(ScenarioError::Config(ConfigError::UnknownMember { .. })))
    ));
    assert_eq!(orchestrator.oracle().calls(), 0);
}

#[test]
fn test_missing_scenarios_fail_the_run() {
    let orchestrator = SolveOrchestrator::new(sequential(), ScriptedOracle::new());
    assert!(matches!(
        orchestrator.run(&flowforge_core::InputTables::new()),
        Err(ConfigError::NoScenarios)
    ));
}

#[test]
fn test_unrepresentable_run_time_fails_only_its_scenario() {
    let tables = scenarios_a_and_b().with_table(
        "Parameters",
        vec![row! { "Scenario" => "A", "Parameter" => "Max Run Time", "Value" => 1e20 }],
    );
    let orchestrator = SolveOrchestrator::new(sequential(), ScriptedOracle::new().then(shipped));

    let report = orchestrator.run(&tables).unwrap();

    assert!(matches!(report.get("A"), Some(Err(ScenarioError::Settings(_)))));
    let b = report.get("B").unwrap().as_ref().unwrap();
    assert_eq!(b.value(FLOW_VAR), Some(100.0));
    assert_eq!(orchestrator.oracle().calls(), 1);
}
