//! The space: variables, live propagators and branchers of one search node.
//!
//! Model code creates variables and posts constraints into a [`Space`].
//! [`Space::status`] runs propagation to a fixpoint and reports whether the
//! node failed, is solved, or needs branching. Search explores the tree by
//! cloning spaces; a clone shares nothing mutable with its original.

use crate::branch::{Alternative, BranchConfig, Brancher, Choice, FailureHistory};
use crate::error::{CpError, Result};
use crate::propagation::{Fixpoint, PropId, PropSlots, Propagator, Scheduler};
use crate::propagators::{Distinct, Linear, NoOverlap, Relation};
use crate::var::{limits, DomainFailure, IntVar, Mutation, VarId, VarStore};
use tracing::trace;

/// Outcome of [`Space::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpaceStatus {
    /// Some domain became empty.
    Failed,
    /// Every variable is assigned and propagation is at fixpoint.
    Solved,
    /// Propagation is at fixpoint but some variable is unassigned.
    Stable,
}

/// A constraint store plus everything needed to propagate and branch on it.
///
/// # Examples
///
/// ```
/// use u_cpsolve::propagators::Relation;
/// use u_cpsolve::space::{Space, SpaceStatus};
///
/// let mut space = Space::new();
/// let x = space.int_var(0, 5).unwrap();
/// let y = space.int_var(0, 5).unwrap();
/// space.rel(x, Relation::Gt, y).unwrap();
/// space.rel_const(y, Relation::Ge, 4).unwrap();
///
/// assert_eq!(space.status(), SpaceStatus::Solved);
/// assert_eq!(space.val(x), Some(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Space {
    store: VarStore,
    props: PropSlots,
    scheduler: Scheduler,
    branchers: Vec<Brancher>,
    failed_by: Option<PropId>,
}

impl Space {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- variables ----

    /// Creates a variable with domain `[min, max]`.
    ///
    /// Both bounds must lie within [`limits::MIN`]..=[`limits::MAX`].
    pub fn int_var(&mut self, min: i64, max: i64) -> Result<VarId> {
        Self::check_bounds(min, max)?;
        Ok(self.store.push(min, max))
    }

    /// Creates `n` variables with domain `[min, max]`.
    pub fn int_vars(&mut self, n: usize, min: i64, max: i64) -> Result<Vec<VarId>> {
        Self::check_bounds(min, max)?;
        Ok((0..n).map(|_| self.store.push(min, max)).collect())
    }

    fn check_bounds(min: i64, max: i64) -> Result<()> {
        limits::check(min, "lower bound")?;
        limits::check(max, "upper bound")?;
        if min > max {
            return Err(CpError::EmptyDomain { min, max });
        }
        Ok(())
    }

    pub fn var_count(&self) -> usize {
        self.store.len()
    }

    /// Read access to the domain of `x`.
    pub fn var(&self, x: VarId) -> &IntVar {
        self.store.var(x)
    }

    pub fn min(&self, x: VarId) -> i64 {
        self.store.min(x)
    }

    pub fn max(&self, x: VarId) -> i64 {
        self.store.max(x)
    }

    pub fn size(&self, x: VarId) -> u64 {
        self.store.size(x)
    }

    pub fn assigned(&self, x: VarId) -> bool {
        self.store.assigned(x)
    }

    pub fn val(&self, x: VarId) -> Option<i64> {
        self.store.val(x)
    }

    /// Values of `xs`, or `None` if any of them is unassigned.
    pub fn values(&self, xs: &[VarId]) -> Option<Vec<i64>> {
        xs.iter().map(|&x| self.store.val(x)).collect()
    }

    // ---- direct domain operations ----
    //
    // These write straight into the store and wake subscribers; the effect
    // of propagation shows after the next `status()`.

    pub fn tighten_min(&mut self, x: VarId, value: i64) -> Mutation {
        self.mutate(x, |s| s.tighten_min(x, value))
    }

    pub fn tighten_max(&mut self, x: VarId, value: i64) -> Mutation {
        self.mutate(x, |s| s.tighten_max(x, value))
    }

    pub fn exclude(&mut self, x: VarId, value: i64) -> Mutation {
        self.mutate(x, |s| s.exclude(x, value))
    }

    pub fn assign(&mut self, x: VarId, value: i64) -> Mutation {
        self.mutate(x, |s| s.assign(x, value))
    }

    /// Restricts `x` to `[lo, hi]`.
    pub fn dom(&mut self, x: VarId, lo: i64, hi: i64) -> Mutation {
        self.mutate(x, |s| s.restrict(x, lo, hi))
    }

    /// Enforces `x rel c` immediately.
    pub fn rel_const(&mut self, x: VarId, rel: Relation, c: i64) -> Mutation {
        match rel {
            Relation::Eq => self.assign(x, c),
            Relation::Ne => self.exclude(x, c),
            Relation::Le => self.tighten_max(x, c),
            Relation::Lt => self.tighten_max(x, c.saturating_sub(1)),
            Relation::Ge => self.tighten_min(x, c),
            Relation::Gt => self.tighten_min(x, c.saturating_add(1)),
        }
    }

    fn mutate(&mut self, x: VarId, op: impl FnOnce(&mut VarStore) -> Mutation) -> Mutation {
        if self.store.is_failed() {
            return Err(DomainFailure::on(x));
        }
        match op(&mut self.store) {
            Ok(event) => {
                let events = self.store.drain_events();
                self.scheduler.notify(&events, &self.props);
                Ok(event)
            }
            Err(failure) => {
                self.fail(None);
                Err(failure)
            }
        }
    }

    fn fail(&mut self, culprit: Option<PropId>) {
        self.store.mark_failed();
        self.scheduler.clear();
        self.failed_by = culprit;
    }

    // ---- propagators ----

    /// Installs `prop` and schedules its first run.
    ///
    /// Returns `None` without posting when the space has already failed.
    pub fn post(&mut self, prop: impl Propagator + 'static) -> Option<PropId> {
        if self.store.is_failed() {
            return None;
        }
        let id = PropId(self.props.len());
        self.scheduler.subscribe(id, &prop.subscriptions());
        self.scheduler.schedule(id, prop.cost());
        trace!(event = "post", propagator = prop.name(), id = %id);
        self.props.push(Some(Box::new(prop)));
        Some(id)
    }

    /// Rectangles `(x[i], y[i])` of size `w[i] × h[i]` must not overlap.
    ///
    /// Nothing is posted for fewer than two rectangles or into a failed
    /// space; argument lengths are checked either way.
    pub fn no_overlap(
        &mut self,
        x: &[VarId],
        w: &[i64],
        y: &[VarId],
        h: &[i64],
    ) -> Result<Option<PropId>> {
        let prop = NoOverlap::new(x.to_vec(), w.to_vec(), y.to_vec(), h.to_vec())?;
        self.check_vars(x.iter().chain(y))?;
        if prop.len() <= 1 {
            return Ok(None);
        }
        Ok(self.post(prop))
    }

    /// `Σ coeffs[i] * vars[i] rel c`.
    pub fn linear(
        &mut self,
        coeffs: &[i64],
        vars: &[VarId],
        rel: Relation,
        c: i64,
    ) -> Result<Option<PropId>> {
        let prop = Linear::new(coeffs, vars, rel, c)?;
        self.check_vars(vars)?;
        Ok(self.post(prop))
    }

    /// `Σ vars[i] rel c`.
    pub fn sum(&mut self, vars: &[VarId], rel: Relation, c: i64) -> Result<Option<PropId>> {
        self.linear(&vec![1; vars.len()], vars, rel, c)
    }

    /// `x rel y`.
    pub fn rel(&mut self, x: VarId, rel: Relation, y: VarId) -> Result<Option<PropId>> {
        self.linear(&[1, -1], &[x, y], rel, 0)
    }

    /// Pairwise distinct values.
    pub fn distinct(&mut self, vars: &[VarId]) -> Result<Option<PropId>> {
        self.check_vars(vars)?;
        if vars.len() <= 1 {
            return Ok(None);
        }
        Ok(self.post(Distinct::new(vars.to_vec())))
    }

    fn check_vars<'a>(&self, vars: impl IntoIterator<Item = &'a VarId>) -> Result<()> {
        match vars.into_iter().find(|&&x| !self.store.contains_var(x)) {
            Some(&x) => Err(CpError::UnknownVariable(x.index())),
            None => Ok(()),
        }
    }

    // ---- status ----

    /// Propagates to a fixpoint and classifies the result.
    pub fn status(&mut self) -> SpaceStatus {
        if self.store.is_failed() {
            return SpaceStatus::Failed;
        }
        match self.scheduler.fixpoint(&mut self.store, &mut self.props) {
            Fixpoint::Failed { culprit } => {
                self.failed_by = culprit;
                SpaceStatus::Failed
            }
            Fixpoint::Stable if self.store.all_assigned() => SpaceStatus::Solved,
            Fixpoint::Stable => SpaceStatus::Stable,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.store.is_failed()
    }

    /// Propagator that emptied a domain, if the failure came from one.
    pub fn failed_by(&self) -> Option<PropId> {
        self.failed_by
    }

    /// Number of propagators ever posted (live or subsumed).
    pub fn propagator_count(&self) -> usize {
        self.props.len()
    }

    /// Number of propagators not yet subsumed.
    pub fn active_propagators(&self) -> usize {
        self.props.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_active(&self, id: PropId) -> bool {
        self.props.get(id.index()).is_some_and(Option::is_some)
    }

    /// Number of live propagators subscribed to `x`.
    pub fn degree(&self, x: VarId) -> usize {
        self.scheduler.degree(x)
    }

    /// Number of propagator runs performed in this space and its ancestors.
    pub fn propagations(&self) -> u64 {
        self.scheduler.propagations()
    }

    // ---- branching ----

    /// Registers a brancher over `vars`.
    ///
    /// Branchers are consulted in registration order; once all of them are
    /// done, any variable still unassigned is split lexicographically.
    pub fn branch(&mut self, vars: &[VarId], config: BranchConfig) -> Result<()> {
        self.check_vars(vars)?;
        self.branchers.push(Brancher::new(vars.to_vec(), config));
        Ok(())
    }

    pub fn brancher_count(&self) -> usize {
        self.branchers.len()
    }

    /// Picks the next decision for a stable space, or `None` if every
    /// variable is assigned.
    pub fn choose(&mut self, afc: &FailureHistory) -> Option<Choice> {
        for brancher in &mut self.branchers {
            if let Some(choice) = brancher.choose(&self.store, &self.scheduler, afc) {
                return Some(choice);
            }
        }
        let x = self.store.ids().find(|&x| !self.store.assigned(x))?;
        let (min, max) = (self.store.min(x), self.store.max(x));
        let mid = min + (max - min) / 2;
        Some(Choice::new(x, Alternative::Le(mid), Alternative::Gt(mid)))
    }

    /// Applies alternative `alt` (0 or 1) of `choice`.
    pub fn commit(&mut self, choice: &Choice, alt: usize) -> Mutation {
        let x = choice.var;
        match choice.alternative(alt) {
            Alternative::Le(v) => self.tighten_max(x, v),
            Alternative::Gt(v) => self.tighten_min(x, v.saturating_add(1)),
            Alternative::Eq(v) => self.assign(x, v),
            Alternative::Ne(v) => self.exclude(x, v),
        }
    }
}
