//! Per-scenario preparation: split, expand, parse, derive, validate.

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::records::Records;
use crate::schema;
use crate::sets::NetworkSets;
use crate::table::InputTables;
use crate::wildcard::{expand_wildcards, split_by_scenario, SCENARIO_COLUMN};

/// Name used when objectives carry no Scenario column at all.
pub const DEFAULT_SCENARIO: &str = "Base";

/// Fully resolved input of one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioData {
    pub name: String,
    pub sets: NetworkSets,
    pub records: Records,
}

impl ScenarioData {
    /// Resolves one scenario's tables into derived sets and typed records.
    ///
    /// Any rule row that references a member outside the derived sets fails
    /// here, before a model is built.
    pub fn prepare(name: &str, tables: &InputTables) -> Result<Self> {
        let mut sets = NetworkSets::derive(tables)?;
        let expanded = expand_wildcards(tables, &sets)?;
        let records = Records::parse(name, &expanded)?;
        sets.attach_arcs(&records.od_distances, &records.transport_costs);
        records.validate(&sets)?;

        debug!(
            event = "scenario_prepared",
            scenario = name,
            node_count = sets.nodes.len(),
            period_count = sets.periods.len(),
            product_count = sets.products.len(),
            arc_count = sets.arcs.len(),
        );

        Ok(Self {
            name: name.to_string(),
            sets,
            records,
        })
    }

    /// The scenario's cap on total launch cost, if declared.
    pub fn max_launch_cost(&self) -> Option<f64> {
        self.records
            .scenarios
            .iter()
            .find(|s| s.name == self.name)
            .and_then(|s| s.max_launch_cost)
    }
}

/// Scenario names declared by the Scenarios table, falling back to the
/// explicit values of the Objectives Scenario column.
pub fn scenario_names(tables: &InputTables) -> Result<Vec<String>> {
    let declared = tables
        .get(schema::SCENARIOS.name)
        .map(|t| t.explicit_values(SCENARIO_COLUMN))
        .unwrap_or_default();
    if !declared.is_empty() {
        return Ok(declared);
    }
    match tables.get(schema::OBJECTIVES.name) {
        Some(t) if t.has_column(SCENARIO_COLUMN) => {
            let names = t.explicit_values(SCENARIO_COLUMN);
            if names.is_empty() {
                Err(ConfigError::NoScenarios)
            } else {
                Ok(names)
            }
        }
        Some(t) if !t.is_empty() => Ok(vec![DEFAULT_SCENARIO.to_string()]),
        _ => Err(ConfigError::NoScenarios),
    }
}

/// Splits run-level tables into per-scenario tables, in scenario order.
pub fn split_scenarios(tables: &InputTables) -> Result<Vec<(String, InputTables)>> {
    let names = scenario_names(tables)?;
    Ok(split_by_scenario(tables, &names)?.into_iter().collect())
}
