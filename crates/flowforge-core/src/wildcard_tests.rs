//! Tests for wildcard resolution and scenario preparation.

use crate::error::ConfigError;
use crate::scenario::{scenario_names, split_scenarios, ScenarioData};
use crate::table::{Cell, InputTables, Row};
use crate::wildcard::*;
use crate::row;

fn set(members: &[&str]) -> Vec<String> {
    members.iter().map(|m| m.to_string()).collect()
}

#[test]
fn test_split_replaces_wildcard_rows() {
    let rows = vec![
        row! { "Node" => "*", "Product" => "P", "Cost" => 1.0 },
        row! { "Node" => "C", "Product" => "Q", "Cost" => 9.0 },
    ];
    let out = split_asterisk_values(&rows, "Node", &set(&["A", "B"]), &["Node", "Product"]);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0]["Node"], Cell::text("A"));
    assert_eq!(out[1]["Node"], Cell::text("B"));
    assert_eq!(out[1]["Cost"], Cell::Number(1.0));
    assert_eq!(out[2]["Node"], Cell::text("C"));
}

#[test]
fn test_split_explicit_row_takes_precedence() {
    let rows = vec![
        row! { "Node" => "*", "Cost" => 1.0 },
        row! { "Node" => "B", "Cost" => 5.0 },
    ];
    let out = split_asterisk_values(&rows, "Node", &set(&["A", "B", "C"]), &["Node"]);
    let b: Vec<&Row> = out.iter().filter(|r| r["Node"] == Cell::text("B")).collect();
    assert_eq!(b.len(), 1);
    assert_eq!(b[0]["Cost"], Cell::Number(5.0));
    assert_eq!(out.len(), 3);
}

#[test]
fn test_split_is_idempotent() {
    let rows = vec![
        row! { "Node" => "*", "Mode" => "*", "Cost" => 1.0 },
        row! { "Node" => "A", "Mode" => "rail", "Cost" => 2.0 },
    ];
    let nodes = set(&["A", "B"]);
    let modes = set(&["rail", "truck"]);
    let key = ["Node", "Mode"];
    let once = split_asterisk_values(
        &split_asterisk_values(&rows, "Node", &nodes, &key),
        "Mode",
        &modes,
        &key,
    );
    let twice = split_asterisk_values(
        &split_asterisk_values(&once, "Node", &nodes, &key),
        "Mode",
        &modes,
        &key,
    );
    assert_eq!(once, twice);
    assert_eq!(once.len(), 4);
}

#[test]
fn test_split_leaves_input_untouched() {
    let rows = vec![row! { "Node" => "*" }];
    let before = rows.clone();
    let _ = split_asterisk_values(&rows, "Node", &set(&["A"]), &[]);
    assert_eq!(rows, before);
}

#[test]
fn test_fill_missing_values_one_row_per_element() {
    let rows = vec![
        row! { "Product" => "P", "Measure" => "kg", "Value" => 2.0 },
        row! { "Product" => "Q", "Measure" => "unit", "Value" => Cell::Empty },
    ];
    let products = set(&["P", "Q"]);
    let measures = set(&["kg", "unit"]);
    let out = fill_missing_values(
        "Products",
        &rows,
        &[("Product", products.as_slice()), ("Measure", measures.as_slice())],
        &row! { "Value" => 0.0 },
    )
    .unwrap();
    assert_eq!(out.len(), 4);

    let value = |p: &str, m: &str| {
        out.iter()
            .find(|r| r["Product"] == Cell::text(p) && r["Measure"] == Cell::text(m))
            .map(|r| r["Value"].clone())
    };
    assert_eq!(value("P", "kg"), Some(Cell::Number(2.0)));
    assert_eq!(value("P", "unit"), Some(Cell::Number(0.0)));
    assert_eq!(value("Q", "unit"), Some(Cell::Number(0.0)));
}

#[test]
fn test_fill_missing_values_never_overwrites_and_is_idempotent() {
    let rows = vec![row! { "Node" => "A", "Weight" => 7.0 }];
    let nodes = set(&["A", "B"]);
    let defaults = row! { "Weight" => 1.0 };
    let once = fill_missing_values("T", &rows, &[("Node", nodes.as_slice())], &defaults).unwrap();
    let twice = fill_missing_values("T", &once, &[("Node", nodes.as_slice())], &defaults).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once[0]["Weight"], Cell::Number(7.0));
    assert_eq!(once[1]["Weight"], Cell::Number(1.0));
}

#[test]
fn test_fill_missing_values_keeps_rows_outside_product() {
    let rows = vec![row! { "Node" => "Z", "Weight" => 3.0 }];
    let nodes = set(&["A"]);
    let out = fill_missing_values("T", &rows, &[("Node", nodes.as_slice())], &row! { "Weight" => 1.0 })
        .unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[1]["Node"], Cell::text("Z"));
}

#[test]
fn test_fill_missing_values_rejects_conflicting_rows() {
    let nodes = set(&["A", "B"]);
    let defaults = row! { "Cost" => 0.0 };

    let same = vec![row! { "Node" => "A", "Cost" => 1.0 }, row! { "Node" => "A", "Cost" => 1.0 }];
    let out = fill_missing_values("T", &same, &[("Node", nodes.as_slice())], &defaults).unwrap();
    assert_eq!(out.len(), 2);

    let clash = vec![row! { "Node" => "A", "Cost" => 1.0 }, row! { "Node" => "A", "Cost" => 2.0 }];
    assert_eq!(
        fill_missing_values("T", &clash, &[("Node", nodes.as_slice())], &defaults),
        Err(ConfigError::ConflictingRows {
            table: "T".to_string(),
            key: "A".to_string(),
        })
    );
}

#[test]
fn test_dedupe_collapses_identical_and_rejects_conflicts() {
    let same = vec![row! { "Node" => "A", "Cost" => 1.0 }, row! { "Node" => "A", "Cost" => 1.0 }];
    assert_eq!(dedupe_rows("T", same, &["Node"]).unwrap().len(), 1);

    let clash = vec![row! { "Node" => "A", "Cost" => 1.0 }, row! { "Node" => "A", "Cost" => 2.0 }];
    assert!(matches!(
        dedupe_rows("T", clash, &["Node"]),
        Err(ConfigError::ConflictingRows { .. })
    ));
}

#[test]
fn test_split_by_scenario_catch_all_applies_after_specific() {
    let tables = InputTables::new()
        .with_table(
            "Scenarios",
            vec![row! { "Scenario" => "S1" }, row! { "Scenario" => "S2" }],
        )
        .with_table(
            "Demand",
            vec![
                row! { "Scenario" => "*", "Period" => 1, "Product" => "P", "Destination" => "D", "Demand" => 10.0 },
                row! { "Scenario" => "S2", "Period" => 1, "Product" => "P", "Destination" => "D", "Demand" => 20.0 },
            ],
        )
        .with_table("Periods", vec![row! { "Period" => 1 }]);

    let split = split_scenarios(&tables).unwrap();
    assert_eq!(split.len(), 2);
    let demand = |i: usize| split[i].1.rows("Demand")[0]["Demand"].as_number();
    assert_eq!(split[0].0, "S1");
    assert_eq!(demand(0), Some(10.0));
    assert_eq!(demand(1), Some(20.0));
    assert_eq!(split[1].1.rows("Demand").len(), 1);
    assert_eq!(split[1].1.rows("Periods").len(), 1);
}

#[test]
fn test_split_by_scenario_rejects_undeclared_scenario() {
    let tables = InputTables::new()
        .with_table("Scenarios", vec![row! { "Scenario" => "S1" }])
        .with_table(
            "Parameters",
            vec![row! { "Scenario" => "S9", "Parameter" => "Gap Limit", "Value" => 0.1 }],
        );

    assert_eq!(
        split_scenarios(&tables).unwrap_err(),
        ConfigError::UnknownMember {
            table: "Parameters".to_string(),
            set: "scenario",
            value: "S9".to_string(),
        }
    );
}

#[test]
fn test_scenario_names_fall_back_to_objectives() {
    let tables = InputTables::new().with_table(
        "Objectives",
        vec![
            row! { "Scenario" => "B", "Priority" => 1, "Objective" => "Minimize Cost" },
            row! { "Scenario" => "*", "Priority" => 2, "Objective" => "Minimize Dropped Volume" },
            row! { "Scenario" => "A", "Priority" => 1, "Objective" => "Minimize Cost" },
        ],
    );
    assert_eq!(scenario_names(&tables).unwrap(), vec!["A", "B"]);
    assert!(matches!(
        scenario_names(&InputTables::new()),
        Err(ConfigError::NoScenarios)
    ));
}

fn small_network() -> InputTables {
    InputTables::new()
        .with_table("Periods", vec![row! { "Period" => 1 }, row! { "Period" => 2 }])
        .with_table("Products", vec![row! { "Product" => "P", "Measure" => "unit" }])
        .with_table(
            "Nodes",
            vec![
                row! { "Name" => "O", "Origin Node" => "X", "Send to Destinations" => "X" },
                row! { "Name" => "D", "Destination Node" => "X", "Receive from Origins" => "X" },
            ],
        )
        .with_table(
            "OD Distances",
            vec![row! { "Origin" => "O", "Destination" => "D", "Mode" => "truck", "Distance" => 10.0 }],
        )
}

#[test]
fn test_prepare_expands_rule_tables() {
    let tables = small_network().with_table(
        "Demand",
        vec![row! { "Period" => "*", "Product" => "*", "Destination" => "D", "Demand" => 5.0 }],
    );
    let data = ScenarioData::prepare("Base", &tables).unwrap();
    assert_eq!(data.records.demand.len(), 2);
    assert_eq!(data.sets.arcs.len(), 1);
    assert_eq!(data.records.products.len(), 1);
}

#[test]
fn test_prepare_rejects_unknown_node() {
    let tables = small_network().with_table(
        "Demand",
        vec![row! { "Period" => 1, "Product" => "P", "Destination" => "Nowhere", "Demand" => 5.0 }],
    );
    assert!(matches!(
        ScenarioData::prepare("Base", &tables),
        Err(ConfigError::UnknownMember { value, .. }) if value == "Nowhere"
    ));
}

#[test]
fn test_prepare_rejects_duplicate_priority() {
    let tables = small_network().with_table(
        "Objectives",
        vec![
            row! { "Priority" => 1, "Objective" => "Minimize Cost" },
            row! { "Priority" => 1, "Objective" => "Minimize Dropped Volume" },
        ],
    );
    assert!(matches!(
        ScenarioData::prepare("Base", &tables),
        Err(ConfigError::DuplicatePriority { priority: 1, .. })
    ));
}

#[test]
fn test_prepare_rejects_conflicting_explicit_rows() {
    let tables = small_network().with_table(
        "Demand",
        vec![
            row! { "Period" => 1, "Product" => "P", "Destination" => "D", "Demand" => 5.0 },
            row! { "Period" => 1, "Product" => "P", "Destination" => "D", "Demand" => 6.0 },
        ],
    );
    assert!(matches!(
        ScenarioData::prepare("Base", &tables),
        Err(ConfigError::ConflictingRows { .. })
    ));
}

#[test]
fn test_prepare_rejects_relaxation_outside_unit_interval() {
    let tables = small_network().with_table(
        "Objectives",
        vec![row! { "Priority" => 1, "Objective" => "Minimize Cost", "Relaxation" => 1.5 }],
    );
    assert!(matches!(
        ScenarioData::prepare("Base", &tables),
        Err(ConfigError::InvalidValue { .. })
    ));
}
