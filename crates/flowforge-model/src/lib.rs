//! FlowForge Model - MILP assembly for supply-chain networks
//!
//! Turns one prepared scenario into a mixed-integer linear program:
//! - Linear expressions and constraints ([`LinearExpr`], [`Constraint`])
//! - The model container ([`Model`]) with feasibility checking
//! - Decision variables per category ([`VariableSpace`])
//! - Constraint families built in a fixed order ([`ConstraintFamily`])
//! - The objective library ([`objective_expression`], [`StageObjective`])
//!
//! ## Logging
//!
//! - **DEBUG**: `family_built` per constraint family, `model_built` once

pub mod builder;
pub mod constraint;
pub mod error;
pub mod linear;
pub mod model;
pub mod objective;
pub mod params;
pub mod variables;

pub use builder::{BuiltModel, ModelBuilder};
pub use constraint::{BuildContext, ConstraintFamily, DemandMode};
pub use error::{ModelError, Result};
pub use linear::{Constraint, LinearExpr, Sense, VarId};
pub use model::{Domain, Model, ObjectiveSense, Variable};
pub use objective::{objective_expression, StageObjective};
pub use params::Params;
pub use variables::{CostComponent, Kpis, VarFamily, VariableSpace};
