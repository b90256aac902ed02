//! Constraint families.
//!
//! Each family is a pure function of the scenario data and the declared
//! variables that appends rows to the model. Families are built in the
//! fixed order of [`ConstraintFamily::ALL`], so the same input always
//! yields the same row order.

mod age;
mod assembly;
mod capacity;
mod cost;
mod flow;
mod lifecycle;
mod plan_over_plan;
mod resource;
mod transportation;

#[cfg(test)]
mod tests;

use std::fmt;

use flowforge_config::ModelSettings;
use flowforge_core::{NetworkSets, Records, ScenarioData};

use crate::error::Result;
use crate::model::Model;
use crate::params::Params;
use crate::variables::VariableSpace;

/// How demand rows bind delivered volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DemandMode {
    /// `delivered + dropped = demand`.
    #[default]
    Exact,
    /// `delivered + dropped >= demand`, letting capacity objectives push
    /// volume past demand.
    AtLeast,
}

/// Everything a family reads while appending rows.
pub struct BuildContext<'a> {
    pub data: &'a ScenarioData,
    pub params: &'a Params,
    pub vars: &'a VariableSpace,
    pub settings: &'a ModelSettings,
    pub demand_mode: DemandMode,
}

impl<'a> BuildContext<'a> {
    pub fn sets(&self) -> &'a NetworkSets {
        &self.data.sets
    }

    pub fn records(&self) -> &'a Records {
        &self.data.records
    }

    pub fn big_m(&self) -> f64 {
        self.settings.big_m
    }
}

/// The closed set of constraint families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    Flow,
    Capacity,
    Transportation,
    ResourceLifecycle,
    NodeLifecycle,
    Age,
    Assembly,
    PlanOverPlan,
    CostAccounting,
}

impl ConstraintFamily {
    pub const ALL: [ConstraintFamily; 9] = [
        ConstraintFamily::Flow,
        ConstraintFamily::Capacity,
        ConstraintFamily::Transportation,
        ConstraintFamily::ResourceLifecycle,
        ConstraintFamily::NodeLifecycle,
        ConstraintFamily::Age,
        ConstraintFamily::Assembly,
        ConstraintFamily::PlanOverPlan,
        ConstraintFamily::CostAccounting,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConstraintFamily::Flow => "flow",
            ConstraintFamily::Capacity => "capacity",
            ConstraintFamily::Transportation => "transportation",
            ConstraintFamily::ResourceLifecycle => "resource_lifecycle",
            ConstraintFamily::NodeLifecycle => "node_lifecycle",
            ConstraintFamily::Age => "age",
            ConstraintFamily::Assembly => "assembly",
            ConstraintFamily::PlanOverPlan => "plan_over_plan",
            ConstraintFamily::CostAccounting => "cost_accounting",
        }
    }

    /// Appends the family's rows and returns how many were added.
    pub fn build(self, ctx: &BuildContext<'_>, model: &mut Model) -> Result<usize> {
        let before = model.num_constraints();
        match self {
            ConstraintFamily::Flow => flow::build(ctx, model)?,
            ConstraintFamily::Capacity => capacity::build(ctx, model)?,
            ConstraintFamily::Transportation => transportation::build(ctx, model)?,
            ConstraintFamily::ResourceLifecycle => resource::build(ctx, model)?,
            ConstraintFamily::NodeLifecycle => lifecycle::build(ctx, model)?,
            ConstraintFamily::Age => age::build(ctx, model)?,
            ConstraintFamily::Assembly => assembly::build(ctx, model)?,
            ConstraintFamily::PlanOverPlan => plan_over_plan::build(ctx, model)?,
            ConstraintFamily::CostAccounting => cost::build(ctx, model)?,
        }
        Ok(model.num_constraints() - before)
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
