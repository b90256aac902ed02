//! Model assembly.

use std::time::Instant;

use flowforge_config::ModelSettings;
use flowforge_core::{ObjectiveKind, ObjectiveRecord, ScenarioData};
use tracing::debug;

use crate::constraint::{BuildContext, ConstraintFamily, DemandMode};
use crate::error::Result;
use crate::model::Model;
use crate::params::Params;
use crate::variables::VariableSpace;

impl DemandMode {
    /// Demand is a floor when any objective maximizes capacity.
    pub fn for_objectives(objectives: &[ObjectiveRecord]) -> Self {
        if objectives
            .iter()
            .any(|o| o.objective == ObjectiveKind::MaximizeCapacity)
        {
            DemandMode::AtLeast
        } else {
            DemandMode::Exact
        }
    }
}

/// A model together with the lookups needed to read its solutions.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub model: Model,
    pub vars: VariableSpace,
    pub params: Params,
}

/// Builds the model of one scenario.
///
/// # Example
///
/// ```no_run
/// use flowforge_config::ModelSettings;
/// use flowforge_core::{InputTables, ScenarioData};
/// use flowforge_model::ModelBuilder;
///
/// # fn tables() -> InputTables { InputTables::new() }
/// let data = ScenarioData::prepare("Base", &tables()).unwrap();
/// let built = ModelBuilder::new(&data, &ModelSettings::default()).build().unwrap();
/// println!("{} variables", built.model.num_variables());
/// ```
pub struct ModelBuilder<'a> {
    data: &'a ScenarioData,
    settings: &'a ModelSettings,
    demand_mode: DemandMode,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(data: &'a ScenarioData, settings: &'a ModelSettings) -> Self {
        Self {
            data,
            settings,
            demand_mode: DemandMode::for_objectives(&data.records.objectives),
        }
    }

    pub fn with_demand_mode(mut self, mode: DemandMode) -> Self {
        self.demand_mode = mode;
        self
    }

    /// Declares every variable category and builds every constraint family
    /// in order.
    pub fn build(self) -> Result<BuiltModel> {
        let start = Instant::now();
        let params = Params::new(self.data, self.settings);
        let mut model = Model::new();
        let vars = VariableSpace::declare(self.data, &params, &mut model)?;

        let ctx = BuildContext {
            data: self.data,
            params: &params,
            vars: &vars,
            settings: self.settings,
            demand_mode: self.demand_mode,
        };
        for family in ConstraintFamily::ALL {
            let rows = family.build(&ctx, &mut model)?;
            debug!(
                event = "family_built",
                scenario = self.data.name.as_str(),
                family = family.name(),
                rows = rows,
            );
        }

        debug!(
            event = "model_built",
            scenario = self.data.name.as_str(),
            variable_count = model.num_variables(),
            integer_count = model.num_integral(),
            constraint_count = model.num_constraints(),
            duration_ms = start.elapsed().as_millis() as u64,
        );

        Ok(BuiltModel { model, vars, params })
    }
}
