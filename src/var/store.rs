//! The variable store: every domain of a space plus the pending event log.

use super::domain::{DomainFailure, IntVar, ModEvent, Mutation};
use std::fmt;

/// Handle to a variable inside a [`VarStore`].
///
/// Handles are plain indices, so they stay valid in every clone of the
/// space that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Owns the domains of one space.
///
/// Every mutation goes through the store so that the resulting
/// [`ModEvent`] is logged; the space drains the log after each propagator
/// run to wake subscribers. Once a mutation has failed the store is
/// poisoned and any further write is a programming error.
#[derive(Debug, Clone, Default)]
pub struct VarStore {
    vars: Vec<IntVar>,
    events: Vec<(VarId, ModEvent)>,
    failed: bool,
}

impl VarStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, min: i64, max: i64) -> VarId {
        self.vars.push(IntVar::new(min, max));
        VarId(self.vars.len() - 1)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the store holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Whether `x` belongs to this store.
    pub fn contains_var(&self, x: VarId) -> bool {
        x.0 < self.vars.len()
    }

    /// Read access to the domain of `x`.
    pub fn var(&self, x: VarId) -> &IntVar {
        &self.vars[x.0]
    }

    /// Iterates over all handles in creation order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> {
        (0..self.vars.len()).map(VarId)
    }

    pub fn min(&self, x: VarId) -> i64 {
        self.vars[x.0].min()
    }

    pub fn max(&self, x: VarId) -> i64 {
        self.vars[x.0].max()
    }

    pub fn size(&self, x: VarId) -> u64 {
        self.vars[x.0].size()
    }

    pub fn assigned(&self, x: VarId) -> bool {
        self.vars[x.0].assigned()
    }

    /// The value of `x` if it is assigned.
    pub fn val(&self, x: VarId) -> Option<i64> {
        self.vars[x.0].val()
    }

    pub fn contains(&self, x: VarId, value: i64) -> bool {
        self.vars[x.0].contains(value)
    }

    /// Whether a mutation has emptied a domain.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Whether every variable is assigned.
    pub fn all_assigned(&self) -> bool {
        self.vars.iter().all(IntVar::assigned)
    }

    pub fn tighten_min(&mut self, x: VarId, value: i64) -> Mutation {
        self.apply(x, |v| v.tighten_min(value))
    }

    pub fn tighten_max(&mut self, x: VarId, value: i64) -> Mutation {
        self.apply(x, |v| v.tighten_max(value))
    }

    /// Keeps only `[lo, hi]` in the domain of `x`.
    pub fn restrict(&mut self, x: VarId, lo: i64, hi: i64) -> Mutation {
        self.apply(x, |v| v.restrict(lo, hi))
    }

    pub fn exclude(&mut self, x: VarId, value: i64) -> Mutation {
        self.apply(x, |v| v.exclude(value))
    }

    /// Removes `[lo, hi]` from the domain of `x`.
    pub fn exclude_range(&mut self, x: VarId, lo: i64, hi: i64) -> Mutation {
        self.apply(x, |v| v.exclude_range(lo, hi))
    }

    pub fn assign(&mut self, x: VarId, value: i64) -> Mutation {
        self.apply(x, |v| v.assign(value))
    }

    fn apply(&mut self, x: VarId, op: impl FnOnce(&mut IntVar) -> Mutation) -> Mutation {
        assert!(!self.failed, "mutation of {x} after the store failed");
        match op(&mut self.vars[x.0]) {
            Ok(ModEvent::NoChange) => Ok(ModEvent::NoChange),
            Ok(event) => {
                self.events.push((x, event));
                Ok(event)
            }
            Err(_) => {
                self.failed = true;
                Err(DomainFailure::on(x))
            }
        }
    }

    /// Takes the events logged since the last drain.
    pub(crate) fn drain_events(&mut self) -> Vec<(VarId, ModEvent)> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
        self.events.clear();
    }
}
