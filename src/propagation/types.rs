//! The propagator capability interface.

use crate::var::{DomainFailure, ModEvent, VarId, VarStore};
use std::fmt;

/// Handle to a propagator posted in a space.
///
/// Like [`VarId`], ids are positions and survive cloning. A subsumed
/// propagator keeps its id; the slot just stays empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropId(pub(crate) usize);

impl PropId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Which kind of change on a variable wakes a propagator.
///
/// Ordered from narrowest to widest: a wider condition is woken by every
/// event a narrower one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropCondition {
    /// Only when the variable becomes assigned.
    Assigned,
    /// When either bound moves (assignment included).
    Bounds,
    /// On any removal, interior holes included.
    Domain,
}

impl PropCondition {
    /// Whether `event` is relevant for this condition.
    pub fn woken_by(self, event: ModEvent) -> bool {
        match self {
            PropCondition::Assigned => event == ModEvent::Assigned,
            PropCondition::Bounds => event >= ModEvent::Bounds,
            PropCondition::Domain => event >= ModEvent::Domain,
        }
    }
}

/// A (variable, condition) pair a propagator listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub var: VarId,
    pub cond: PropCondition,
}

impl Subscription {
    pub fn new(var: VarId, cond: PropCondition) -> Self {
        Self { var, cond }
    }
}

/// Scheduling priority: cheaper propagators run first.
///
/// Only affects performance. Propagators must reach the same fixpoint in
/// any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropCost {
    Unary,
    Binary,
    Linear,
    Quadratic,
}

impl PropCost {
    pub(crate) const LEVELS: usize = 4;

    /// Linear for short arrays, quadratic otherwise.
    pub fn quadratic(arity: usize) -> Self {
        if arity <= 2 {
            PropCost::Binary
        } else {
            PropCost::Quadratic
        }
    }

    /// Linear cost, degraded to `Binary` / `Unary` for tiny arrays.
    pub fn linear(arity: usize) -> Self {
        match arity {
            0 | 1 => PropCost::Unary,
            2 => PropCost::Binary,
            _ => PropCost::Linear,
        }
    }

    pub(crate) fn level(self) -> usize {
        self as usize
    }
}

/// How a propagator run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropStatus {
    /// Nothing more to do until a subscribed event fires.
    Fixed,
    /// The constraint holds for every remaining tightening; drop the
    /// propagator for the rest of this space's life.
    Subsumed,
}

/// Result of [`Propagator::propagate`]: `Err` means the space failed.
pub type PropResult = Result<PropStatus, DomainFailure>;

/// A constraint implementation that prunes domains.
///
/// A propagator only sees variables through the [`VarStore`] it is
/// handed, so every write is logged and turned into wakeups. Its own
/// writes also wake it when they match one of its subscriptions, so a
/// non-idempotent propagator is simply run again.
///
/// Returning `Ok` after a store write failed is a contract violation and
/// panics in the scheduler: always propagate failures with `?`.
pub trait Propagator: fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The variables and conditions that wake this propagator.
    fn subscriptions(&self) -> Vec<Subscription>;

    /// Scheduling cost estimate.
    fn cost(&self) -> PropCost;

    /// Prunes domains.
    fn propagate(&mut self, store: &mut VarStore) -> PropResult;

    /// Deep copy, including any auxiliary buffers.
    fn box_clone(&self) -> Box<dyn Propagator>;
}

impl Clone for Box<dyn Propagator> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_wakeups() {
        assert!(PropCondition::Domain.woken_by(ModEvent::Domain));
        assert!(PropCondition::Domain.woken_by(ModEvent::Assigned));
        assert!(!PropCondition::Bounds.woken_by(ModEvent::Domain));
        assert!(PropCondition::Bounds.woken_by(ModEvent::Bounds));
        assert!(!PropCondition::Assigned.woken_by(ModEvent::Bounds));
        assert!(PropCondition::Assigned.woken_by(ModEvent::Assigned));
        assert!(!PropCondition::Domain.woken_by(ModEvent::NoChange));
    }

    #[test]
    fn test_wider_condition_covers_narrower() {
        let all = [PropCondition::Assigned, PropCondition::Bounds, PropCondition::Domain];
        let events = [ModEvent::Domain, ModEvent::Bounds, ModEvent::Assigned];
        for a in all {
            for b in all {
                let wide = a.max(b);
                for e in events {
                    assert!(!(a.woken_by(e) || b.woken_by(e)) || wide.woken_by(e));
                }
            }
        }
    }

    #[test]
    fn test_cost_levels() {
        assert_eq!(PropCost::linear(1), PropCost::Unary);
        assert_eq!(PropCost::linear(9), PropCost::Linear);
        assert_eq!(PropCost::quadratic(2), PropCost::Binary);
        assert_eq!(PropCost::quadratic(10), PropCost::Quadratic);
        assert!(PropCost::Unary.level() < PropCost::Quadratic.level());
        assert_eq!(PropCost::Quadratic.level() + 1, PropCost::LEVELS);
    }
}
