//! The objective library.
//!
//! Every named objective maps to a linear expression over the declared
//! variables. Maximizing objectives are installed as the minimization of
//! their negation, so a model always minimizes.

use flowforge_core::ObjectiveKind;

use crate::linear::{LinearExpr, Sense, VarId};
use crate::variables::VariableSpace;

fn sum<'a>(vars: impl Iterator<Item = &'a VarId>) -> LinearExpr {
    LinearExpr::weighted(vars.map(|&v| (v, 1.0)))
}

/// The expression an objective optimizes, in its natural orientation.
pub fn objective_expression(kind: ObjectiveKind, vars: &VariableSpace) -> LinearExpr {
    match kind {
        ObjectiveKind::MinimizeCost => sum(vars.costs.values()),
        ObjectiveKind::MinimizeMaximumTransitDistance => vars.kpis.max_transit_distance.into(),
        ObjectiveKind::MinimizeMaximumAge => vars.kpis.max_age.into(),
        ObjectiveKind::MaximizeCapacity => vars.kpis.total_delivered.into(),
        ObjectiveKind::MinimizeMaximumUtilization => vars.kpis.max_utilization.into(),
        ObjectiveKind::MinimizePlanOverPlanChange => vars.kpis.total_volume_moved.into(),
        ObjectiveKind::MinimizeDroppedVolume => sum(vars.dropped.values()),
        ObjectiveKind::MinimizeCarriedOverVolume => {
            sum(vars.ib_carried.values().chain(vars.ob_carried.values()))
        }
    }
}

/// An objective ready to install as a stage's minimization target.
#[derive(Debug, Clone, PartialEq)]
pub struct StageObjective {
    pub kind: ObjectiveKind,
    /// Natural orientation; reported values are measured on this.
    pub expr: LinearExpr,
}

impl StageObjective {
    pub fn new(kind: ObjectiveKind, vars: &VariableSpace) -> Self {
        Self {
            kind,
            expr: objective_expression(kind, vars),
        }
    }

    /// The expression to minimize.
    pub fn minimized(&self) -> LinearExpr {
        if self.kind.is_maximize() {
            -self.expr.clone()
        } else {
            self.expr.clone()
        }
    }

    /// Bound that keeps later stages within `relaxation` of `value`.
    ///
    /// The relaxation is applied to `|value|` so a negative optimum still
    /// loosens in the right direction, and `tolerance` absorbs solver
    /// round-off.
    pub fn freeze_bound(&self, value: f64, relaxation: f64, tolerance: f64) -> (Sense, f64) {
        let slack = value.abs() * relaxation + tolerance;
        if self.kind.is_maximize() {
            (Sense::Ge, value - slack)
        } else {
            (Sense::Le, value + slack)
        }
    }
}
