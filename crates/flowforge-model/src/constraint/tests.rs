//! Tests for constraint family assembly.

use flowforge_config::ModelSettings;
use flowforge_core::{split_scenarios, InputTables, ObjectiveKind, ObjectiveRecord, ScenarioData};
use flowforge_core::row;
use flowforge_test::network::{
    base_network, capacity_network, scenario_a, with_objectives, with_periods, DESTINATION,
    FLOW_VAR, ORIGIN,
};

use crate::builder::{BuiltModel, ModelBuilder};
use crate::constraint::{ConstraintFamily, DemandMode};
use crate::linear::Sense;
use crate::model::Model;
use crate::objective::StageObjective;

fn prepare(tables: &InputTables) -> ScenarioData {
    let (name, split) = split_scenarios(tables).unwrap().remove(0);
    ScenarioData::prepare(&name, &split).unwrap()
}

fn build(tables: &InputTables) -> BuiltModel {
    let data = prepare(tables);
    ModelBuilder::new(&data, &ModelSettings::default())
        .build()
        .unwrap()
}

/// A zero assignment for `model` with the named variables set.
///
/// Local copy of `flowforge_test::oracle::assign`: that helper takes the
/// `Model` of the separately compiled `flowforge-model` dependency of
/// `flowforge-test`, which is a distinct type from `crate::model::Model`
/// inside this crate's unit tests. Unknown names are ignored.
fn assign(model: &Model, values: &[(&str, f64)]) -> Vec<f64> {
    let mut out = vec![0.0; model.num_variables()];
    for (name, value) in values {
        if let Some(id) = model.var(name) {
            out[id.index()] = *value;
        }
    }
    out
}

/// Coefficient of `var` in the normalized row `row`.
fn coef(model: &Model, row: &str, var: &str) -> f64 {
    let c = model
        .constraint(row)
        .unwrap_or_else(|| panic!("no row {row}"));
    let v = model.var(var).unwrap_or_else(|| panic!("no variable {var}"));
    c.expr.coefficient(v)
}

fn cost_only(tables: InputTables, scenario: &str) -> InputTables {
    with_objectives(tables, scenario, &[(1, "Minimize Cost", 0.0)])
}

#[test]
fn test_family_order_is_fixed() {
    let names: Vec<&str> = ConstraintFamily::ALL.iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec![
            "flow",
            "capacity",
            "transportation",
            "resource_lifecycle",
            "node_lifecycle",
            "age",
            "assembly",
            "plan_over_plan",
            "cost_accounting",
        ]
    );
}

#[test]
fn test_building_twice_yields_identical_rows() {
    let a = build(&scenario_a());
    let b = build(&scenario_a());
    assert_eq!(a.model.constraints(), b.model.constraints());
    assert_eq!(a.model.variables(), b.model.variables());
}

#[test]
fn test_two_node_network_rows() {
    let built = build(&scenario_a());
    let m = &built.model;
    let flow = m.var(FLOW_VAR).unwrap();
    let arrived = m.var("arrived[D,P,1]").unwrap();

    let arrival = m.constraint("arrival[D,P,1]").unwrap();
    assert_eq!(arrival.sense, Sense::Eq);
    assert_eq!(arrival.expr.coefficient(arrived), 1.0);
    assert_eq!(arrival.expr.coefficient(flow), -1.0);

    let demand = m.constraint("demand[D,P,1]").unwrap();
    assert_eq!(demand.sense, Sense::Eq);
    assert_eq!(demand.rhs, 100.0);

    let cap = m.constraint("flow_max[0]").unwrap();
    assert_eq!((cap.sense, cap.rhs), (Sense::Le, 150.0));
    assert_eq!(cap.expr.coefficient(flow), 1.0);

    let cost = m.constraint("transport_cost[O,D,1,truck]").unwrap();
    assert_eq!(cost.sense, Sense::Ge);
    assert_eq!(cost.expr.coefficient(flow), -1.0);

    assert!(m.constraint("cost[transportation]").is_some());
    assert!(m.constraint("cost[dropping]").is_some());
}

#[test]
fn test_no_age_rows_without_age_rules() {
    let built = build(&scenario_a());
    assert!(!built.vars.tracks_age());
    assert!(built
        .model
        .constraints()
        .iter()
        .all(|c| !c.name.starts_with("age_")));
}

#[test]
fn test_capacity_rolls_up_at_relative_rate() {
    let built = build(&capacity_network(80.0));
    let m = &built.model;
    let picking = m.var("consumption[D,1,Picking]").unwrap();
    let labor = m.var("consumption[D,1,Labor]").unwrap();
    let processed = m.var("processed[D,P,1]").unwrap();

    let direct = m.constraint("consumption[D,1,Picking]").unwrap();
    assert_eq!(direct.expr.coefficient(picking), 1.0);
    assert_eq!(direct.expr.coefficient(processed), -2.0);

    let parent = m.constraint("consumption[D,1,Labor]").unwrap();
    assert_eq!(parent.expr.coefficient(labor), 1.0);
    assert_eq!(parent.expr.coefficient(picking), -0.5);
    assert_eq!(parent.expr.coefficient(processed), 0.0);

    let capacity = m.constraint("resource_capacity[D,1,Labor]").unwrap();
    let crew = m.var("resources_assigned[Crew,D,1]").unwrap();
    assert_eq!(capacity.sense, Sense::Le);
    assert_eq!(capacity.expr.coefficient(crew), -80.0);
    assert!(m.constraint("resource_capacity[D,1,Picking]").is_none());
}

#[test]
fn test_demand_mode_follows_objectives() {
    let record = |objective| ObjectiveRecord {
        priority: 1,
        objective,
        relaxation: 0.0,
    };
    assert_eq!(
        DemandMode::for_objectives(&[record(ObjectiveKind::MinimizeCost)]),
        DemandMode::Exact
    );
    assert_eq!(
        DemandMode::for_objectives(&[
            record(ObjectiveKind::MinimizeCost),
            record(ObjectiveKind::MaximizeCapacity),
        ]),
        DemandMode::AtLeast
    );
}

#[test]
fn test_at_least_demand_is_a_floor() {
    let data = prepare(&scenario_a());
    let built = ModelBuilder::new(&data, &ModelSettings::default())
        .with_demand_mode(DemandMode::AtLeast)
        .build()
        .unwrap();
    let demand = built.model.constraint("demand[D,P,1]").unwrap();
    assert_eq!((demand.sense, demand.rhs), (Sense::Ge, 100.0));
}

#[test]
fn test_freeze_bound_relaxes_away_from_the_optimum() {
    let built = build(&scenario_a());
    let cost = StageObjective::new(ObjectiveKind::MinimizeCost, &built.vars);
    let (sense, bound) = cost.freeze_bound(100.0, 0.1, 0.0);
    assert_eq!(sense, Sense::Le);
    assert!((bound - 110.0).abs() < 1e-9);

    let (sense, bound) = cost.freeze_bound(-50.0, 0.2, 1e-6);
    assert_eq!(sense, Sense::Le);
    assert!((bound - (-40.0 + 1e-6)).abs() < 1e-9);

    let capacity = StageObjective::new(ObjectiveKind::MaximizeCapacity, &built.vars);
    let (sense, bound) = capacity.freeze_bound(100.0, 0.25, 0.0);
    assert_eq!((sense, bound), (Sense::Ge, 75.0));
    assert_eq!(capacity.minimized(), -capacity.expr.clone());
}

#[test]
fn test_lane_without_flow_rule_has_no_cap() {
    let tables = base_network(150.0).with_table("Flow", Vec::new()).with_table(
        "Objectives",
        vec![flowforge_core::row! { "Priority" => 1, "Objective" => "Minimize Cost" }],
    );
    let built = build(&tables);
    assert!(built.model.constraint("flow_max[0]").is_none());
}

/// Three periods; `D` starts closed, belongs to type `DC`, is forced to
/// launch in period 2 and may launch at most once.
fn lifecycle_network() -> InputTables {
    let tables = with_periods(base_network(150.0), 3)
        .with_table(
            "Nodes",
            vec![
                row! { "Name" => ORIGIN, "Origin Node" => "X", "Send to Destinations" => "X" },
                row! {
                    "Name" => DESTINATION,
                    "Destination Node" => "X",
                    "Receive from Origins" => "X",
                    "Node Type" => "DC",
                    "Initially Operating" => 0,
                    "Max Launches" => 1,
                    "Min Operating Duration" => 2,
                    "Max Shutdown Duration" => 1,
                },
            ],
        )
        .with_table(
            "Node Types",
            vec![row! { "Period" => 1, "Node Type" => "DC", "Max Operating" => 1 }],
        )
        .with_table(
            "Node Events",
            vec![row! { "Period" => 2, "Node" => DESTINATION, "Launch" => "X" }],
        )
        .with_table(
            "Operating Costs",
            vec![row! { "Period" => 2, "Node" => DESTINATION, "Launch Cost" => 50.0 }],
        )
        .with_table(
            "Scenarios",
            vec![row! { "Scenario" => "L", "Max Launch Cost" => 100.0 }],
        );
    cost_only(tables, "L")
}

#[test]
fn test_node_lifecycle_rows() {
    let built = build(&lifecycle_network());
    let m = &built.model;

    let first = m.constraint("node_state[D,1]").unwrap();
    assert_eq!((first.sense, first.rhs), (Sense::Eq, 0.0));
    assert_eq!(coef(m, "node_state[D,1]", "operating[D,1]"), 1.0);
    assert_eq!(coef(m, "node_state[D,1]", "launched[D,1]"), -1.0);
    assert_eq!(coef(m, "node_state[D,1]", "shut_down[D,1]"), 1.0);
    assert_eq!(coef(m, "node_state[D,2]", "operating[D,1]"), -1.0);
    assert_eq!(m.constraint("node_state[O,1]").unwrap().rhs, 1.0);

    let forced = m.constraint("forced_launch[D,2]").unwrap();
    assert_eq!((forced.sense, forced.rhs), (Sense::Eq, 1.0));
    assert!(m.constraint("forced_shutdown[D,2]").is_none());

    let max = m.constraint("max_launches[D]").unwrap();
    assert_eq!((max.sense, max.rhs), (Sense::Le, 1.0));
    assert_eq!(coef(m, "max_launches[D]", "launched[D,3]"), 1.0);
    assert!(m.constraint("min_launches[D]").is_none());

    // A launch in period 2 or 3 keeps D operating in period 3.
    let hold = m.constraint("min_operating_duration[D,3]").unwrap();
    assert_eq!((hold.sense, hold.rhs), (Sense::Le, 0.0));
    assert_eq!(coef(m, "min_operating_duration[D,3]", "launched[D,2]"), 1.0);
    assert_eq!(coef(m, "min_operating_duration[D,3]", "launched[D,3]"), 1.0);
    assert_eq!(coef(m, "min_operating_duration[D,3]", "launched[D,1]"), 0.0);
    assert_eq!(coef(m, "min_operating_duration[D,3]", "operating[D,3]"), -1.0);

    let dc = m.constraint("node_type_max[DC,1]").unwrap();
    assert_eq!((dc.sense, dc.rhs), (Sense::Le, 1.0));
    assert_eq!(coef(m, "node_type_max[DC,1]", "operating[D,1]"), 1.0);
    assert!(m.constraint("node_type_min[DC,1]").is_none());

    let budget = m.constraint("launch_budget[L]").unwrap();
    assert_eq!((budget.sense, budget.rhs), (Sense::Le, 100.0));
    assert_eq!(coef(m, "launch_budget[L]", "launched[D,2]"), 50.0);
    assert_eq!(coef(m, "launch_budget[L]", "launched[D,1]"), 0.0);
}

#[test]
fn test_max_shutdown_duration_only_binds_after_a_shutdown() {
    let built = build(&lifecycle_network());
    let m = &built.model;

    for t in [1, 2] {
        let name = format!("max_shutdown_duration[D,{t}]");
        let row = m.constraint(&name).unwrap();
        assert_eq!((row.sense, row.rhs), (Sense::Ge, 0.0));
        assert_eq!(coef(m, &name, &format!("shut_down[D,{t}]")), -1.0);
        assert_eq!(coef(m, &name, &format!("operating[D,{t}]")), 1.0);
    }
    assert!(m.constraint("max_shutdown_duration[D,3]").is_none());

    // A node that stays closed without ever shutting down is unconstrained.
    let closed = assign(m, &[]);
    let row = m.constraint("max_shutdown_duration[D,1]").unwrap();
    assert_eq!(row.violation(&closed), 0.0);

    // A shutdown with no relaunch in the next period is not.
    let stranded = assign(m, &[("shut_down[D,1]", 1.0)]);
    assert_eq!(row.violation(&stranded), 1.0);
    let relaunched = assign(m, &[("shut_down[D,1]", 1.0), ("operating[D,2]", 1.0)]);
    assert_eq!(row.violation(&relaunched), 0.0);
}

#[test]
fn test_resource_lifecycle_rows() {
    let van = |t: i64| {
        row! {
            "Period" => t,
            "Node" => DESTINATION,
            "Resource" => "Van",
            "Initial Count" => 2.0,
            "Max Count" => 5.0,
            "Add Increment" => 2.0,
        }
    };
    let tables = with_periods(capacity_network(80.0), 2)
        .with_table("Resource Costs", vec![van(1), van(2)])
        .with_table(
            "Resource Attributes",
            vec![row! { "Period" => 1, "Resource" => "Van", "Attribute" => "Doors", "Value" => 3.0 }],
        )
        .with_table(
            "Resource Attribute Constraints",
            vec![row! { "Period" => 1, "Node" => DESTINATION, "Attribute" => "Doors", "Max" => 9.0 }],
        );
    let built = build(&tables);
    let m = &built.model;

    // Crew has no cost rows, so its count is fixed at one.
    let crew = m.constraint("fixed_resource[Crew,D,2]").unwrap();
    assert_eq!((crew.sense, crew.rhs), (Sense::Eq, 1.0));
    assert!(m.constraint("resource_balance[Crew,D,1]").is_none());

    let opening = m.constraint("resource_balance[Van,D,1]").unwrap();
    assert_eq!((opening.sense, opening.rhs), (Sense::Eq, 2.0));
    assert_eq!(coef(m, "resource_balance[Van,D,1]", "resources_assigned[Van,D,1]"), 1.0);
    assert_eq!(coef(m, "resource_balance[Van,D,1]", "resources_added[Van,D,1]"), -1.0);
    assert_eq!(coef(m, "resource_balance[Van,D,1]", "resources_removed[Van,D,1]"), 1.0);

    let carried = m.constraint("resource_balance[Van,D,2]").unwrap();
    assert_eq!(carried.rhs, 0.0);
    assert_eq!(coef(m, "resource_balance[Van,D,2]", "resources_assigned[Van,D,1]"), -1.0);

    assert_eq!(
        coef(m, "resource_add_increment[Van,D,2]", "resource_add_cohorts[Van,D,2]"),
        -2.0
    );
    assert_eq!(
        coef(m, "resource_add_flag[Van,D,1]", "resource_added_flag[Van,D,1]"),
        -ModelSettings::default().big_m
    );

    let max = m.constraint("resource_max[Van,D,1]").unwrap();
    assert_eq!((max.sense, max.rhs), (Sense::Le, 5.0));
    assert!(m.constraint("resource_min[Van,D,1]").is_none());

    let doors = m.constraint("attribute_max[D,1,Doors]").unwrap();
    assert_eq!((doors.sense, doors.rhs), (Sense::Le, 9.0));
    assert_eq!(coef(m, "attribute_max[D,1,Doors]", "resources_assigned[Van,D,1]"), 3.0);
}

#[test]
fn test_age_rows_bucket_carried_volume() {
    let tables = cost_only(with_periods(base_network(150.0), 2), "Age").with_table(
        "Age Constraints",
        vec![row! {
            "Period" => 2,
            "Product" => "P",
            "Destination" => DESTINATION,
            "Age" => 1,
            "Max Volume" => 10.0,
            "Violation Cost" => 5.0,
        }],
    );
    let built = build(&tables);
    let m = &built.model;
    assert!(built.vars.tracks_age());

    assert_eq!(coef(m, "age_bucket[D,P,1,0]", "carried_by_age[D,P,1,0]"), 1.0);
    assert_eq!(coef(m, "age_bucket[D,P,1,0]", "arrived[D,P,1]"), -1.0);

    // The oldest bucket keeps what it held and takes the next younger one.
    let oldest = m.constraint("age_bucket[D,P,2,1]").unwrap();
    assert_eq!((oldest.sense, oldest.rhs), (Sense::Le, 0.0));
    assert_eq!(coef(m, "age_bucket[D,P,2,1]", "carried_by_age[D,P,1,0]"), -1.0);
    assert_eq!(coef(m, "age_bucket[D,P,2,1]", "carried_by_age[D,P,1,1]"), -1.0);

    let total = m.constraint("age_total[D,P,2]").unwrap();
    assert_eq!(total.sense, Sense::Eq);
    assert_eq!(coef(m, "age_total[D,P,2]", "ib_carried[D,P,2]"), -1.0);
    assert_eq!(coef(m, "age_total[D,P,2]", "carried_by_age[D,P,2,1]"), 1.0);

    assert_eq!(coef(m, "max_age[D,P,2,1]", "kpi[max_age]"), 1.0);
    assert_eq!(coef(m, "max_age[D,P,2,1]", "age_held[D,P,2,1]"), -1.0);
    assert!(m.constraint("max_age[D,P,2,0]").is_none());

    let limit = m.constraint("age_limit[D,P,2,1]").unwrap();
    assert_eq!((limit.sense, limit.rhs), (Sense::Le, 10.0));
    assert_eq!(coef(m, "age_limit[D,P,2,1]", "carried_by_age[D,P,2,1]"), 1.0);
    assert_eq!(coef(m, "age_limit[D,P,2,1]", "carried_by_age[D,P,2,0]"), 0.0);
    assert_eq!(coef(m, "age_limit[D,P,2,1]", "age_violation[D,P,2,1]"), -1.0);
}

#[test]
fn test_assembly_rows_fix_product_ratios() {
    let tables = cost_only(base_network(150.0), "Kit")
        .with_table(
            "Products",
            vec![
                row! { "Product" => "P", "Measure" => "unit", "Value" => 1.0 },
                row! { "Product" => "Q", "Measure" => "unit", "Value" => 1.0 },
            ],
        )
        .with_table(
            "Assembly Constraints",
            vec![row! {
                "Period" => 1,
                "Node" => DESTINATION,
                "Product 1" => "P",
                "Product 2" => "Q",
                "Quantity 1" => 2.0,
                "Quantity 2" => 1.0,
            }],
        )
        .with_table(
            "Shipping Assembly Constraints",
            vec![row! {
                "Period" => 1,
                "Origin" => ORIGIN,
                "Destination" => DESTINATION,
                "Mode" => "truck",
                "Product 1" => "P",
                "Product 2" => "Q",
                "Quantity 1" => 1.0,
                "Quantity 2" => 3.0,
            }],
        );
    let built = build(&tables);
    let m = &built.model;

    // Two P per Q at the node.
    let node = m.constraint("assembly[D,1,P,Q]").unwrap();
    assert_eq!((node.sense, node.rhs), (Sense::Eq, 0.0));
    assert_eq!(coef(m, "assembly[D,1,P,Q]", "processed[D,P,1]"), 1.0);
    assert_eq!(coef(m, "assembly[D,1,P,Q]", "processed[D,Q,1]"), -2.0);

    // One P per three Q on the lane.
    let lane = "shipping_assembly[O,D,truck,1,P,Q]";
    assert_eq!(m.constraint(lane).unwrap().sense, Sense::Eq);
    assert_eq!(coef(m, lane, FLOW_VAR), 3.0);
    assert_eq!(coef(m, lane, "flow[O,D,Q,1,truck]"), -1.0);
}

#[test]
fn test_plan_over_plan_rows_track_lane_changes() {
    let built = build(&cost_only(with_periods(base_network(150.0), 2), "Plan"));
    let m = &built.model;

    assert!(m.constraint("plan_change[O,D,P,1]").is_none());
    let row = "plan_change[O,D,P,2]";
    assert_eq!(m.constraint(row).unwrap().sense, Sense::Eq);
    assert_eq!(coef(m, row, "flow[O,D,P,2,truck]"), 1.0);
    assert_eq!(coef(m, row, FLOW_VAR), -1.0);
    assert_eq!(coef(m, row, "volume_up[O,D,P,2]"), -1.0);
    assert_eq!(coef(m, row, "volume_down[O,D,P,2]"), 1.0);

    let moved = "total_volume_moved";
    assert_eq!(coef(m, moved, "kpi[total_volume_moved]"), 1.0);
    assert_eq!(coef(m, moved, "volume_up[O,D,P,2]"), -1.0);
    assert_eq!(coef(m, moved, "volume_down[O,D,P,2]"), -1.0);
}

#[test]
fn test_transportation_rows() {
    let lane = |extra: Vec<(&str, f64)>| {
        let mut r = row! {
            "Period" => 1,
            "Origin" => ORIGIN,
            "Destination" => DESTINATION,
            "Mode" => "truck",
            "Measure" => "unit",
        };
        for (column, value) in extra {
            r.insert(column.to_string(), value.into());
        }
        r
    };
    let mut unit = lane(vec![("Cost per Unit", 1.0), ("Fixed Cost", 25.0), ("Minimum Cost", 40.0)]);
    unit.insert("Container".to_string(), "unit".into());
    let mut load = lane(vec![("Cost per Unit", 7.0)]);
    load.insert("Container".to_string(), "load".into());
    let mut expansion = lane(vec![("Capacity", 20.0), ("Cost", 100.0), ("Max Count", 2.0)]);
    expansion.insert("Expansion".to_string(), "Wide".into());

    let tables = cost_only(base_network(150.0), "T")
        .with_table("Transportation Costs", vec![unit, load])
        .with_table("Load Capacity", vec![lane(vec![("Capacity", 30.0)])])
        .with_table(
            "Transportation Constraints",
            vec![lane(vec![("Max", 50.0), ("Max Distance", 5.0)])],
        )
        .with_table("Transportation Expansions", vec![expansion]);
    let built = build(&tables);
    let m = &built.model;
    let key = "O,D,1,truck";

    let gate = format!("shipment_gate[{key}]");
    assert_eq!(coef(m, &gate, FLOW_VAR), 1.0);
    assert_eq!(
        coef(m, &gate, "shipment[O,D,1,truck]"),
        -ModelSettings::default().big_m
    );
    assert_eq!(coef(m, &format!("transit_distance[{key}]"), "shipment[O,D,1,truck]"), -10.0);

    let loads = format!("load_capacity[{key},unit]");
    assert_eq!(coef(m, &loads, FLOW_VAR), 1.0);
    assert_eq!(coef(m, &loads, "loads[O,D,1,truck]"), -30.0);

    let cost = format!("transport_cost[{key}]");
    assert_eq!(coef(m, &cost, "transport_cost[O,D,1,truck]"), 1.0);
    assert_eq!(coef(m, &cost, FLOW_VAR), -1.0);
    assert_eq!(coef(m, &cost, "shipment[O,D,1,truck]"), -25.0);
    assert_eq!(coef(m, &cost, "loads[O,D,1,truck]"), -7.0);

    let minimum = format!("transport_minimum_cost[{key},unit,unit]");
    assert_eq!(m.constraint(&minimum).unwrap().sense, Sense::Ge);
    assert_eq!(coef(m, &minimum, "shipment[O,D,1,truck]"), -40.0);

    // The lane cap grows by 20 per expansion taken.
    let cap = format!("lane_max[{key},unit]");
    assert_eq!(m.constraint(&cap).unwrap().rhs, 50.0);
    assert_eq!(coef(m, &cap, "transport_expansion[O,D,truck,unit,Wide,1]"), -20.0);
    let count = m
        .constraint("transport_expansion_count[O,D,truck,unit,Wide]")
        .unwrap();
    assert_eq!((count.sense, count.rhs), (Sense::Le, 2.0));

    // The lane is 10 long, past its limit of 5.
    let closed = m.constraint(&format!("lane_closed[{key},unit]")).unwrap();
    assert_eq!((closed.sense, closed.rhs), (Sense::Le, 0.0));
    assert_eq!(coef(m, &format!("lane_closed[{key},unit]"), "shipment[O,D,1,truck]"), 1.0);
}

#[test]
fn test_carrying_capacity_rows() {
    let tables = cost_only(base_network(150.0), "Store")
        .with_table(
            "Carrying Capacity",
            vec![row! {
                "Period" => 1,
                "Node" => DESTINATION,
                "Measure" => "unit",
                "Inbound Capacity" => 40.0,
            }],
        )
        .with_table(
            "Carrying Expansions",
            vec![row! {
                "Period" => 1,
                "Node" => DESTINATION,
                "Measure" => "unit",
                "Expansion" => "Shelf",
                "Inbound Capacity" => 15.0,
                "Cost" => 9.0,
            }],
        );
    let built = build(&tables);
    let m = &built.model;

    let row = "inbound_carrying_capacity[D,unit,1]";
    assert_eq!(m.constraint(row).unwrap().rhs, 40.0);
    assert_eq!(coef(m, row, "ib_carried[D,P,1]"), 1.0);
    assert_eq!(coef(m, row, "carrying_expansion[D,unit,Shelf,1]"), -15.0);
    assert!(m.constraint("outbound_carrying_capacity[D,unit,1]").is_none());

    let once = m.constraint("carrying_expansion_once[D,unit,Shelf]").unwrap();
    assert_eq!((once.sense, once.rhs), (Sense::Le, 1.0));
}
