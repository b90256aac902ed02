//! Input tables for small networks with known optimal plans.
//!
//! The base network is one origin `O` shipping product `P` by `truck` to one
//! destination `D` in a single period:
//!
//! - demand at `D` is 100, with a drop cost far above the $1 per unit
//!   transport cost;
//! - the lane is 10 distance units long;
//! - a Flow rule caps the lane volume.
//!
//! | Fixture | Lane cap | Objectives | Optimal plan |
//! |---|---|---|---|
//! | [`scenario_a`] | 150 | cost | flow 100, dropped 0, cost 100 |
//! | [`scenario_b`] | 60 | cost | flow 60, dropped 40 |
//! | [`scenario_c`] | 150 | cost (r = 0.1), then transit distance | cost 100, then cost <= 110 |
//!
//! [`relay_network`] routes the same demand through an intermediate node
//! over two periods.

use flowforge_core::{row, InputTables, Row};

pub const ORIGIN: &str = "O";
pub const DESTINATION: &str = "D";
pub const PRODUCT: &str = "P";
pub const MODE: &str = "truck";
pub const MEASURE: &str = "unit";
pub const DEMAND: f64 = 100.0;
pub const DISTANCE: f64 = 10.0;
pub const UNIT_COST: f64 = 1.0;
pub const DROP_COST: f64 = 1000.0;

/// Name of the single flow variable of the base network.
pub const FLOW_VAR: &str = "flow[O,D,P,1,truck]";
/// Name of the dropped-volume variable at the destination.
pub const DROPPED_VAR: &str = "dropped[D,P,1]";
/// Name of the delivered-volume variable at the destination.
pub const DELIVERED_VAR: &str = "delivered[D,P,1]";

/// The base network with a lane cap of `max_flow` and no objectives.
pub fn base_network(max_flow: f64) -> InputTables {
    InputTables::new()
        .with_table("Periods", vec![row! { "Period" => 1 }])
        .with_table(
            "Products",
            vec![row! { "Product" => PRODUCT, "Measure" => MEASURE, "Value" => 1.0 }],
        )
        .with_table(
            "Nodes",
            vec![
                row! { "Name" => ORIGIN, "Origin Node" => "X", "Send to Destinations" => "X" },
                row! { "Name" => DESTINATION, "Destination Node" => "X", "Receive from Origins" => "X" },
            ],
        )
        .with_table(
            "OD Distances",
            vec![row! {
                "Origin" => ORIGIN,
                "Destination" => DESTINATION,
                "Mode" => MODE,
                "Distance" => DISTANCE,
            }],
        )
        .with_table(
            "Transportation Costs",
            vec![row! {
                "Period" => 1,
                "Origin" => ORIGIN,
                "Destination" => DESTINATION,
                "Mode" => MODE,
                "Container" => "unit",
                "Measure" => MEASURE,
                "Cost per Unit" => UNIT_COST,
            }],
        )
        .with_table(
            "Demand",
            vec![row! {
                "Period" => 1,
                "Product" => PRODUCT,
                "Destination" => DESTINATION,
                "Demand" => DEMAND,
                "Drop Cost" => DROP_COST,
            }],
        )
        .with_table("Flow", vec![flow_cap(max_flow)])
}

/// A Flow rule capping the `O -> D` lane at `max`.
pub fn flow_cap(max: f64) -> Row {
    row! {
        "Period" => 1,
        "Node" => ORIGIN,
        "Downstream Node" => DESTINATION,
        "Product" => PRODUCT,
        "Mode" => MODE,
        "Measure" => MEASURE,
        "Max" => max,
    }
}

/// Adds an Objectives table for `scenario` from `(priority, name, relaxation)`.
pub fn with_objectives(
    tables: InputTables,
    scenario: &str,
    objectives: &[(i64, &str, f64)],
) -> InputTables {
    let rows = objectives
        .iter()
        .map(|&(priority, name, relaxation)| {
            row! {
                "Scenario" => scenario,
                "Priority" => priority,
                "Objective" => name,
                "Relaxation" => relaxation,
            }
        })
        .collect();
    tables.with_table("Objectives", rows)
}

/// Lane cap 150, cost only.
pub fn scenario_a() -> InputTables {
    with_objectives(base_network(150.0), "A", &[(1, "Minimize Cost", 0.0)])
}

/// Lane cap 60, cost only: 40 units must be dropped.
pub fn scenario_b() -> InputTables {
    with_objectives(base_network(60.0), "B", &[(1, "Minimize Cost", 0.0)])
}

/// Cost with 10% relaxation, then the maximum transit distance.
pub fn scenario_c() -> InputTables {
    with_objectives(
        base_network(150.0),
        "C",
        &[
            (1, "Minimize Cost", 0.1),
            (2, "Minimize Maximum Transit Distance", 0.0),
        ],
    )
}

/// Scenarios A and B in one table set, split by the Scenario column.
pub fn scenarios_a_and_b() -> InputTables {
    let mut a = flow_cap(150.0);
    a.insert("Scenario".to_string(), "A".into());
    let mut b = flow_cap(60.0);
    b.insert("Scenario".to_string(), "B".into());
    base_network(0.0)
        .with_table("Flow", vec![a, b])
        .with_table(
            "Scenarios",
            vec![row! { "Scenario" => "A" }, row! { "Scenario" => "B" }],
        )
        .with_table(
            "Objectives",
            vec![row! { "Scenario" => "*", "Priority" => 1, "Objective" => "Minimize Cost" }],
        )
}

/// The base network with a two-level capacity hierarchy at `D`.
///
/// `Picking` rolls up into `Labor` at half rate; each unit of `P` processed
/// at `D` consumes 2 `Picking`. One `Crew` resource offers `labor` `Labor`.
pub fn capacity_network(labor: f64) -> InputTables {
    with_objectives(base_network(150.0), "Base", &[(1, "Minimize Cost", 0.0)])
        .with_table(
            "Resource Capacity Types",
            vec![
                row! { "Capacity Type" => "Labor" },
                row! { "Capacity Type" => "Picking", "Parent" => "Labor", "Relative Rate" => 0.5 },
            ],
        )
        .with_table(
            "Resource Capacity Consumption",
            vec![row! {
                "Period" => 1,
                "Node" => DESTINATION,
                "Product" => PRODUCT,
                "Capacity Type" => "Picking",
                "Consumption" => 2.0,
            }],
        )
        .with_table(
            "Resource Capacities",
            vec![row! {
                "Period" => 1,
                "Node" => DESTINATION,
                "Resource" => "Crew",
                "Capacity Type" => "Labor",
                "Capacity" => labor,
            }],
        )
}

/// Replaces the Periods table with periods `1..=count`.
pub fn with_periods(tables: InputTables, count: i64) -> InputTables {
    let periods = (1..=count).map(|t| row! { "Period" => t }).collect();
    tables.with_table("Periods", periods)
}

/// Name of the intermediate node of [`relay_network`].
pub const RELAY: &str = "I";

/// `O -> I -> D` over periods 1 and 2, cost only.
///
/// The `O -> I` leg takes one period, so the 100 units demanded at `D` in
/// period 2 must leave `O` in period 1 and pass through `I` in period 2.
/// Each leg costs $1 per unit.
pub fn relay_network() -> InputTables {
    let leg = |origin: &str, destination: &str, transit: i64| {
        row! {
            "Origin" => origin,
            "Destination" => destination,
            "Mode" => MODE,
            "Distance" => DISTANCE,
            "Transit Periods" => transit,
        }
    };
    let cost = |t: i64, origin: &str, destination: &str| {
        row! {
            "Period" => t,
            "Origin" => origin,
            "Destination" => destination,
            "Mode" => MODE,
            "Container" => "unit",
            "Measure" => MEASURE,
            "Cost per Unit" => UNIT_COST,
        }
    };
    let tables = with_periods(base_network(0.0), 2)
        .with_table(
            "Nodes",
            vec![
                row! { "Name" => ORIGIN, "Origin Node" => "X", "Send to Intermediates" => "X" },
                row! {
                    "Name" => RELAY,
                    "Intermediate Node" => "X",
                    "Receive from Origins" => "X",
                    "Send to Destinations" => "X",
                },
                row! { "Name" => DESTINATION, "Destination Node" => "X", "Receive from Intermediates" => "X" },
            ],
        )
        .with_table("OD Distances", vec![leg(ORIGIN, RELAY, 1), leg(RELAY, DESTINATION, 0)])
        .with_table(
            "Transportation Costs",
            vec![
                cost(1, ORIGIN, RELAY),
                cost(2, ORIGIN, RELAY),
                cost(1, RELAY, DESTINATION),
                cost(2, RELAY, DESTINATION),
            ],
        )
        .with_table(
            "Demand",
            vec![row! {
                "Period" => 2,
                "Product" => PRODUCT,
                "Destination" => DESTINATION,
                "Demand" => DEMAND,
                "Drop Cost" => DROP_COST,
            }],
        )
        .with_table("Flow", Vec::new());
    with_objectives(tables, "Relay", &[(1, "Minimize Cost", 0.0)])
}
