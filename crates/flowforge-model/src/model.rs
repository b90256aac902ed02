//! The assembled mixed-integer program.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::linear::{Constraint, LinearExpr, Sense, VarId};

const INTEGRALITY_EPS: f64 = 1e-6;

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Domain {
    Continuous,
    Integer,
    Binary,
}

impl Domain {
    pub fn is_integral(self) -> bool {
        !matches!(self, Domain::Continuous)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub domain: Domain,
    pub lower: f64,
    pub upper: f64,
}

/// Optimization direction of the current objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

/// A mixed-integer linear program.
///
/// The model is mutated between solves only by appending constraints and
/// replacing the objective; variables never change once declared.
#[derive(Debug, Clone, Default)]
pub struct Model {
    variables: Vec<Variable>,
    by_name: HashMap<String, VarId>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    sense: ObjectiveSense,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable. Names are unique per model.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        domain: Domain,
        lower: f64,
        upper: f64,
    ) -> Result<VarId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ModelError::DuplicateVariable(name));
        }
        let (lower, upper) = match domain {
            Domain::Binary => (lower.max(0.0), upper.min(1.0)),
            _ => (lower, upper),
        };
        let id = VarId(self.variables.len());
        self.by_name.insert(name.clone(), id);
        self.variables.push(Variable {
            name,
            domain,
            lower,
            upper,
        });
        Ok(id)
    }

    /// Appends `lhs (sense) rhs` and returns its row index.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        lhs: LinearExpr,
        sense: Sense,
        rhs: impl Into<LinearExpr>,
    ) -> Result<usize> {
        let constraint = Constraint::new(name, lhs, sense, rhs.into());
        if let Some((v, _)) = constraint
            .expr
            .terms()
            .find(|(v, _)| v.0 >= self.variables.len())
        {
            return Err(ModelError::UnknownVariable(v.0));
        }
        self.constraints.push(constraint);
        Ok(self.constraints.len() - 1)
    }

    pub fn set_objective(&mut self, expr: LinearExpr, sense: ObjectiveSense) {
        self.objective = expr;
        self.sense = sense;
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn var(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn objective_sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_integral(&self) -> usize {
        self.variables.iter().filter(|v| v.domain.is_integral()).count()
    }

    /// Largest violation of any row, bound or integrality requirement.
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        let rows = self
            .constraints
            .iter()
            .map(|c| c.violation(values))
            .fold(0.0, f64::max);
        let columns = self
            .variables
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let x = values.get(i).copied().unwrap_or(0.0);
                let bound = (v.lower - x).max(x - v.upper).max(0.0);
                let integral = if v.domain.is_integral() {
                    let frac = (x - x.round()).abs();
                    if frac > INTEGRALITY_EPS {
                        frac
                    } else {
                        0.0
                    }
                } else {
                    0.0
                };
                bound.max(integral)
            })
            .fold(0.0, f64::max);
        rows.max(columns)
    }

    /// Evaluates the current objective at `values`.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_variable_is_rejected() {
        let mut m = Model::new();
        m.add_variable("x", Domain::Continuous, 0.0, f64::INFINITY).unwrap();
        assert_eq!(
            m.add_variable("x", Domain::Integer, 0.0, 1.0),
            Err(ModelError::DuplicateVariable("x".to_string()))
        );
    }

    #[test]
    fn test_binary_bounds_are_clamped() {
        let mut m = Model::new();
        let b = m.add_variable("b", Domain::Binary, -3.0, 8.0).unwrap();
        assert_eq!((m.variable(b).lower, m.variable(b).upper), (0.0, 1.0));
    }

    #[test]
    fn test_foreign_variable_is_rejected() {
        let mut m = Model::new();
        let err = m
            .add_constraint("c", LinearExpr::from(VarId(4)), Sense::Le, 1.0)
            .unwrap_err();
        assert_eq!(err, ModelError::UnknownVariable(4));
    }

    #[test]
    fn test_max_violation_covers_rows_bounds_and_integrality() {
        let mut m = Model::new();
        let x = m.add_variable("x", Domain::Integer, 0.0, 10.0).unwrap();
        let y = m.add_variable("y", Domain::Continuous, 0.0, 1.0).unwrap();
        m.add_constraint("cap", LinearExpr::from(x) + y, Sense::Le, 5.0)
            .unwrap();

        assert_eq!(m.max_violation(&[4.0, 1.0]), 0.0);
        assert!((m.max_violation(&[4.5, 0.0]) - 0.5).abs() < 1e-9);
        assert_eq!(m.max_violation(&[3.0, 2.0]), 1.0);
        assert_eq!(m.max_violation(&[6.0, 0.0]), 1.0);
    }
}
