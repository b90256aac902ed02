//! End-to-end solves of the fixture networks with HiGHS.

use std::sync::Mutex;

use flowforge::prelude::*;
use flowforge::{Model, Sense, SolveLimits, SolverError, SolverOutcome};
use flowforge_test::network::{
    capacity_network, relay_network, scenario_a, scenario_b, scenario_c, scenarios_a_and_b,
    DROPPED_VAR, FLOW_VAR,
};

const EPS: f64 = 1e-4;

fn sequential() -> FlowConfig {
    FlowConfig::default().with_parallel_scenarios(false)
}

fn solved<'a>(report: &'a RunReport, scenario: &str) -> &'a ScenarioResult {
    match report.get(scenario) {
        Some(Ok(result)) => result,
        other => panic!("scenario {scenario} not solved: {other:?}"),
    }
}

/// Forwards to HiGHS and keeps every model it was asked to solve.
struct Recording {
    inner: HighsSolver,
    models: Mutex<Vec<Model>>,
}

impl SolverOracle for Recording {
    fn name(&self) -> &str {
        "recording-highs"
    }

    fn solve(&self, model: &Model, limits: &SolveLimits) -> Result<SolverOutcome, SolverError> {
        self.models.lock().unwrap().push(model.clone());
        self.inner.solve(model, limits)
    }
}

#[test]
fn test_uncapped_lane_ships_all_demand() {
    let report = solve(&scenario_a(), sequential()).unwrap();
    let result = solved(&report, "A");

    assert!((result.value(FLOW_VAR).unwrap() - 100.0).abs() < EPS);
    assert!(result.value(DROPPED_VAR).unwrap().abs() < EPS);
    assert!((result.costs["transportation"] - 100.0).abs() < EPS);
    assert!((result.total_cost() - 100.0).abs() < EPS);
    assert!(result.optimal);
}

#[test]
fn test_capped_lane_drops_the_shortfall() {
    let report = solve(&scenario_b(), sequential()).unwrap();
    let result = solved(&report, "B");

    assert!((result.value(FLOW_VAR).unwrap() - 60.0).abs() < EPS);
    assert!((result.value(DROPPED_VAR).unwrap() - 40.0).abs() < EPS);
}

#[test]
fn test_second_stage_respects_relaxed_cost() {
    let oracle = Recording {
        inner: HighsSolver::new(),
        models: Mutex::new(Vec::new()),
    };
    let report = solve_with(&scenario_c(), sequential(), &oracle).unwrap();
    let result = solved(&report, "C");

    assert_eq!(result.stages.len(), 2);
    assert!((result.stages[0].value - 100.0).abs() < EPS);
    assert!((result.stages[1].value - 10.0).abs() < EPS);
    assert!(result.costs["transportation"] <= 110.0 + EPS);
    assert!((result.value(FLOW_VAR).unwrap() - 100.0).abs() < EPS);

    let models = oracle.models.lock().unwrap();
    assert_eq!(models.len(), 2);
    let freeze = models[1].constraint("freeze[1]").unwrap();
    assert_eq!(freeze.sense, Sense::Le);
    assert!((freeze.rhs - 110.0).abs() < 1e-3);
}

#[test]
fn test_labor_capacity_limits_processing() {
    let report = solve(&capacity_network(80.0), sequential()).unwrap();
    let result = solved(&report, "Base");

    assert!((result.value(DROPPED_VAR).unwrap() - 20.0).abs() < EPS);
    assert!((result.value("consumption[D,1,Labor]").unwrap() - 80.0).abs() < EPS);
}

#[test]
fn test_parallel_scenarios_match_sequential() {
    let parallel = solve(&scenarios_a_and_b(), FlowConfig::default()).unwrap();
    let serial = solve(&scenarios_a_and_b(), sequential()).unwrap();

    for name in ["A", "B"] {
        let p = solved(&parallel, name);
        let s = solved(&serial, name);
        assert!((p.value(FLOW_VAR).unwrap() - s.value(FLOW_VAR).unwrap()).abs() < EPS);
    }
    assert!((solved(&parallel, "B").value(FLOW_VAR).unwrap() - 60.0).abs() < EPS);
}

#[test]
fn test_solve_scenario_picks_one() {
    let result = flowforge::solve_scenario(&scenarios_a_and_b(), "B", sequential()).unwrap();
    assert_eq!(result.scenario, "B");

    let err = flowforge::solve_scenario(&scenarios_a_and_b(), "Z", sequential()).unwrap_err();
    assert!(matches!(err, FlowForgeError::Input(_)));
}

#[test]
fn test_report_json_lists_every_scenario() {
    let report = solve(&scenarios_a_and_b(), sequential()).unwrap();
    let json = report_to_json(&report).unwrap();

    assert_eq!(json["scenarios"]["A"]["scenario"], "A");
    assert_eq!(json["scenarios"]["B"]["stages"][0]["status"], "optimal");
}

#[test]
fn test_solve_json_reads_table_json() {
    let json = serde_json::to_string(&scenario_a()).unwrap();
    let report = solve_json(&json).unwrap();
    assert!(report.is_success());
    assert!((solved(&report, "A").value(FLOW_VAR).unwrap() - 100.0).abs() < EPS);
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let config = FlowConfig::default().with_gap_limit(1.5);
    let err = solve(&scenario_a(), config).unwrap_err();
    assert!(matches!(err, FlowForgeError::Config(_)));
}

#[test]
fn test_relay_conserves_volume_across_the_transit_lag() {
    let report = solve(&relay_network(), sequential()).unwrap();
    let result = solved(&report, "Relay");
    let value = |name: &str| result.value(name).unwrap_or_else(|| panic!("no variable {name}"));

    // The one-period leg must depart in period 1 to arrive in period 2.
    assert!((value("flow[O,I,P,1,truck]") - 100.0).abs() < EPS);
    assert!(result.value("flow[O,I,P,2,truck]").is_none());
    assert!(value("arrived[I,P,1]").abs() < EPS);
    assert!((value("arrived[I,P,2]") - 100.0).abs() < EPS);

    // Everything that reaches I moves on to D in the same period.
    assert!(value("flow[I,D,P,1,truck]").abs() < EPS);
    assert!((value("flow[I,D,P,2,truck]") - 100.0).abs() < EPS);
    assert!((value("arrived[D,P,2]") - 100.0).abs() < EPS);
    assert!((value("delivered[D,P,2]") - 100.0).abs() < EPS);
    assert!(value("dropped[D,P,2]").abs() < EPS);

    assert!((result.costs["transportation"] - 200.0).abs() < EPS);
}
