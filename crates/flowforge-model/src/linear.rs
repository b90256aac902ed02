//! Linear expressions and constraints over model variables.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::Serialize;

const ZERO_EPS: f64 = 1e-12;

/// Index of a variable inside its [`Model`](crate::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// `sum(coef * var) + constant`.
///
/// Terms whose coefficient cancels to zero are dropped, so two expressions
/// that differ only by zero terms compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinearExpr {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_const(value: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    pub fn term(var: VarId, coef: f64) -> Self {
        let mut e = Self::zero();
        e.add_term(var, coef);
        e
    }

    /// Sums `(var, coef)` pairs.
    pub fn weighted(terms: impl IntoIterator<Item = (VarId, f64)>) -> Self {
        let mut e = Self::zero();
        for (v, c) in terms {
            e.add_term(v, c);
        }
        e
    }

    pub fn add_term(&mut self, var: VarId, coef: f64) {
        let slot = self.terms.entry(var).or_insert(0.0);
        *slot += coef;
        if slot.abs() <= ZERO_EPS {
            self.terms.remove(&var);
        }
    }

    /// Adds `scale * other` in place.
    pub fn add_scaled(&mut self, other: &LinearExpr, scale: f64) {
        self.constant += other.constant * scale;
        for (v, c) in &other.terms {
            self.add_term(*v, c * scale);
        }
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn scaled(&self, k: f64) -> Self {
        let mut e = Self::zero();
        e.add_scaled(self, k);
        e
    }

    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().map(|(v, c)| (*v, *c))
    }

    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// No variable terms (the constant may be non-zero).
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression at `values`, indexed by [`VarId::index`].
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }

    pub(crate) fn without_constant(mut self) -> (Self, f64) {
        let c = self.constant;
        self.constant = 0.0;
        (self, c)
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        LinearExpr::term(var, 1.0)
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        LinearExpr::from_const(value)
    }
}

impl AddAssign<&LinearExpr> for LinearExpr {
    fn add_assign(&mut self, rhs: &LinearExpr) {
        self.add_scaled(rhs, 1.0);
    }
}

impl AddAssign for LinearExpr {
    fn add_assign(&mut self, rhs: LinearExpr) {
        self.add_scaled(&rhs, 1.0);
    }
}

impl SubAssign<&LinearExpr> for LinearExpr {
    fn sub_assign(&mut self, rhs: &LinearExpr) {
        self.add_scaled(rhs, -1.0);
    }
}

impl SubAssign for LinearExpr {
    fn sub_assign(&mut self, rhs: LinearExpr) {
        self.add_scaled(&rhs, -1.0);
    }
}

impl<T: Into<LinearExpr>> Add<T> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: T) -> LinearExpr {
        let rhs: LinearExpr = rhs.into();
        self += rhs;
        self
    }
}

impl<T: Into<LinearExpr>> Sub<T> for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: T) -> LinearExpr {
        let rhs: LinearExpr = rhs.into();
        self -= rhs;
        self
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self.scaled(-1.0)
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, k: f64) -> LinearExpr {
        self.scaled(k)
    }
}

impl Sum for LinearExpr {
    fn sum<I: Iterator<Item = LinearExpr>>(iter: I) -> Self {
        iter.fold(LinearExpr::zero(), |acc, e| acc + e)
    }
}

/// Constraint direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "=",
        })
    }
}

/// `expr (sense) rhs`, with every constant moved to `rhs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// Builds `lhs (sense) rhs`, normalizing both sides.
    pub fn new(name: impl Into<String>, lhs: LinearExpr, sense: Sense, rhs: LinearExpr) -> Self {
        let (expr, constant) = (lhs - rhs).without_constant();
        Self {
            name: name.into(),
            expr,
            sense,
            rhs: -constant,
        }
    }

    /// Amount by which `values` violate the constraint; zero when satisfied.
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => (lhs - self.rhs).max(0.0),
            Sense::Ge => (self.rhs - lhs).max(0.0),
            Sense::Eq => (lhs - self.rhs).abs(),
        }
    }

    /// Row bounds `(lower, upper)` with infinite open sides.
    pub fn bounds(&self) -> (f64, f64) {
        match self.sense {
            Sense::Le => (f64::NEG_INFINITY, self.rhs),
            Sense::Ge => (self.rhs, f64::INFINITY),
            Sense::Eq => (self.rhs, self.rhs),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for (v, c) in self.expr.terms() {
            write!(f, " {:+} x{}", c, v.0)?;
        }
        write!(f, " {} {}", self.sense, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_terms_are_dropped() {
        let x = VarId(0);
        let mut e = LinearExpr::term(x, 2.0);
        e.add_term(x, -2.0);
        assert!(e.is_empty());
        assert_eq!(e, LinearExpr::zero());
    }

    #[test]
    fn test_constraint_moves_constants_right() {
        let x = VarId(0);
        let y = VarId(1);
        let lhs = LinearExpr::from(x) + LinearExpr::from_const(3.0);
        let rhs = LinearExpr::term(y, 2.0) + LinearExpr::from_const(10.0);
        let c = Constraint::new("c", lhs, Sense::Le, rhs);
        assert_eq!(c.rhs, 7.0);
        assert_eq!(c.expr.coefficient(x), 1.0);
        assert_eq!(c.expr.coefficient(y), -2.0);
        assert_eq!(c.expr.constant(), 0.0);
    }

    #[test]
    fn test_violation_by_sense() {
        let x = VarId(0);
        let le = Constraint::new("le", x.into(), Sense::Le, 5.0.into());
        let ge = Constraint::new("ge", x.into(), Sense::Ge, 5.0.into());
        let eq = Constraint::new("eq", x.into(), Sense::Eq, 5.0.into());
        assert_eq!(le.violation(&[7.0]), 2.0);
        assert_eq!(le.violation(&[3.0]), 0.0);
        assert_eq!(ge.violation(&[3.0]), 2.0);
        assert_eq!(eq.violation(&[3.0]), 2.0);
        assert_eq!(eq.bounds(), (5.0, 5.0));
    }

    #[test]
    fn test_sum_and_evaluate() {
        let e: LinearExpr = (0..3).map(|i| LinearExpr::term(VarId(i), 1.0 + i as f64)).sum();
        assert_eq!(e.len(), 3);
        assert_eq!(e.evaluate(&[1.0, 1.0, 1.0]), 6.0);
        assert_eq!((-e).evaluate(&[1.0, 0.0, 0.0]), -1.0);
    }
}
