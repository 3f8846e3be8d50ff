//! Weighted integer sums.

use crate::error::{CpError, Result};
use crate::propagation::{
    PropCondition, PropCost, PropResult, PropStatus, Propagator, Subscription,
};
use crate::var::{limits, DomainFailure, VarId, VarStore};

/// Comparison operator for relational constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    Eq,
    Ne,
    Le,
    Lt,
    Ge,
    Gt,
}

impl Relation {
    /// Whether `lhs rel rhs` holds.
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Relation::Eq => lhs == rhs,
            Relation::Ne => lhs != rhs,
            Relation::Le => lhs <= rhs,
            Relation::Lt => lhs < rhs,
            Relation::Ge => lhs >= rhs,
            Relation::Gt => lhs > rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Eq,
    Ne,
    Le,
}

/// `Σ coeffs[i] * vars[i]  rel  rhs`.
///
/// `Lt`, `Ge` and `Gt` are rewritten to `Le` at construction. `Eq` and
/// `Le` run bounds reasoning on every bound change; `Ne` waits until at
/// most one variable is unassigned. Coefficients must lie within the
/// variable [`limits`]; sums are accumulated in `i128`, so any number of
/// terms and any `rhs` are safe.
#[derive(Debug, Clone)]
pub struct Linear {
    terms: Vec<(i64, VarId)>,
    kind: Kind,
    rhs: i128,
}

impl Linear {
    pub fn new(coeffs: &[i64], vars: &[VarId], rel: Relation, rhs: i64) -> Result<Self> {
        if coeffs.len() != vars.len() {
            return Err(CpError::ArgumentSizeMismatch {
                constraint: "linear",
                detail: format!("{} coefficients for {} variables", coeffs.len(), vars.len()),
            });
        }
        for &a in coeffs {
            limits::check(a, "coefficient")?;
        }
        let terms: Vec<(i64, VarId)> = coeffs
            .iter()
            .copied()
            .zip(vars.iter().copied())
            .filter(|&(a, _)| a != 0)
            .collect();

        let negate = |terms: Vec<(i64, VarId)>| -> Vec<(i64, VarId)> {
            terms.into_iter().map(|(a, x)| (-a, x)).collect()
        };
        let rhs = i128::from(rhs);
        let (terms, kind, rhs) = match rel {
            Relation::Eq => (terms, Kind::Eq, rhs),
            Relation::Ne => (terms, Kind::Ne, rhs),
            Relation::Le => (terms, Kind::Le, rhs),
            Relation::Lt => (terms, Kind::Le, rhs - 1),
            Relation::Ge => (negate(terms), Kind::Le, -rhs),
            Relation::Gt => (negate(terms), Kind::Le, -rhs - 1),
        };
        Ok(Self { terms, kind, rhs })
    }

    /// Sum of unit coefficients.
    pub fn sum(vars: &[VarId], rel: Relation, rhs: i64) -> Result<Self> {
        Self::new(&vec![1; vars.len()], vars, rel, rhs)
    }

    fn term_bounds(store: &VarStore, a: i64, x: VarId) -> (i128, i128) {
        let a = i128::from(a);
        let (min, max) = (i128::from(store.min(x)), i128::from(store.max(x)));
        if a > 0 {
            (a * min, a * max)
        } else {
            (a * max, a * min)
        }
    }

    fn sum_bounds(&self, store: &VarStore) -> (i128, i128) {
        self.terms.iter().fold((0, 0), |(lo, hi), &(a, x)| {
            let (l, h) = Self::term_bounds(store, a, x);
            (lo + l, hi + h)
        })
    }

    /// Enforces `Σ a·x <= rhs` (or `>= rhs` when `sign` is -1) on bounds.
    fn prune_le(terms: &[(i64, VarId)], store: &mut VarStore, sign: i64, rhs: i128) -> PropResult {
        let lower: i128 = terms
            .iter()
            .map(|&(a, x)| Self::term_bounds(store, sign * a, x).0)
            .sum();
        if lower > rhs {
            return Err(DomainFailure::conflict());
        }
        for &(a, x) in terms {
            let a = sign * a;
            let own = Self::term_bounds(store, a, x).0;
            let slack = rhs - (lower - own);
            if a > 0 {
                store.tighten_max(x, saturate(floor_div(slack, i128::from(a))))?;
            } else {
                store.tighten_min(x, saturate(ceil_div(slack, i128::from(a))))?;
            }
        }
        Ok(PropStatus::Fixed)
    }
}

/// Nearest `i64`. Bounds beyond `i64` are beyond every domain as well.
fn saturate(v: i128) -> i64 {
    i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX })
}

fn floor_div(n: i128, d: i128) -> i128 {
    let q = n / d;
    if (n % d != 0) && ((n < 0) != (d < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(n: i128, d: i128) -> i128 {
    let q = n / d;
    if (n % d != 0) && ((n < 0) == (d < 0)) {
        q + 1
    } else {
        q
    }
}

impl Propagator for Linear {
    fn name(&self) -> &'static str {
        match self.kind {
            Kind::Eq => "linear_eq",
            Kind::Ne => "linear_ne",
            Kind::Le => "linear_le",
        }
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        let cond = match self.kind {
            Kind::Ne => PropCondition::Assigned,
            Kind::Eq | Kind::Le => PropCondition::Bounds,
        };
        self.terms
            .iter()
            .map(|&(_, x)| Subscription::new(x, cond))
            .collect()
    }

    fn cost(&self) -> PropCost {
        PropCost::linear(self.terms.len())
    }

    fn propagate(&mut self, store: &mut VarStore) -> PropResult {
        match self.kind {
            Kind::Le => {
                Self::prune_le(&self.terms, store, 1, self.rhs)?;
                let (_, hi) = self.sum_bounds(store);
                Ok(if hi <= self.rhs {
                    PropStatus::Subsumed
                } else {
                    PropStatus::Fixed
                })
            }
            Kind::Eq => {
                Self::prune_le(&self.terms, store, 1, self.rhs)?;
                Self::prune_le(&self.terms, store, -1, -self.rhs)?;
                let (lo, hi) = self.sum_bounds(store);
                Ok(if lo == self.rhs && hi == self.rhs {
                    PropStatus::Subsumed
                } else {
                    PropStatus::Fixed
                })
            }
            Kind::Ne => {
                let mut fixed_sum: i128 = 0;
                let mut open = None;
                for &(a, x) in &self.terms {
                    match store.val(x) {
                        Some(v) => fixed_sum += i128::from(a) * i128::from(v),
                        None if open.is_none() => open = Some((a, x)),
                        None => return Ok(PropStatus::Fixed),
                    }
                }
                match open {
                    None if fixed_sum == self.rhs => Err(DomainFailure::conflict()),
                    None => Ok(PropStatus::Subsumed),
                    Some((a, x)) => {
                        let (rest, a) = (self.rhs - fixed_sum, i128::from(a));
                        if rest % a == 0 {
                            if let Ok(v) = i64::try_from(rest / a) {
                                store.exclude(x, v)?;
                            }
                        }
                        Ok(PropStatus::Subsumed)
                    }
                }
            }
        }
    }

    fn box_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}
