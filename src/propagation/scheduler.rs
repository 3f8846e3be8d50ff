//! Fixpoint scheduler: wake lists plus a deduplicated, cost-ordered queue.

use super::types::{PropCondition, PropCost, PropId, PropStatus, Propagator, Subscription};
use crate::var::{ModEvent, VarId, VarStore};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Propagator slots of a space. `None` marks a subsumed propagator.
pub(crate) type PropSlots = Vec<Option<Box<dyn Propagator>>>;

/// Pending propagators, one FIFO bucket per [`PropCost`] level.
///
/// A propagator is queued at most once; pushing it again while it waits
/// is a no-op.
#[derive(Debug, Clone, Default)]
pub struct PropQueue {
    buckets: [VecDeque<PropId>; PropCost::LEVELS],
    queued: Vec<bool>,
}

impl PropQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `id` unless it is already waiting. Returns whether it was added.
    pub fn push(&mut self, id: PropId, cost: PropCost) -> bool {
        if id.0 >= self.queued.len() {
            self.queued.resize(id.0 + 1, false);
        }
        if self.queued[id.0] {
            return false;
        }
        self.queued[id.0] = true;
        self.buckets[cost.level()].push_back(id);
        true
    }

    /// Takes the oldest propagator from the cheapest non-empty bucket.
    pub fn pop(&mut self) -> Option<PropId> {
        let id = self.buckets.iter_mut().find_map(VecDeque::pop_front)?;
        self.queued[id.0] = false;
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(VecDeque::is_empty)
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.queued.iter_mut().for_each(|q| *q = false);
    }
}

/// How a fixpoint computation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixpoint {
    /// Queue drained, no propagator can prune further.
    Stable,
    /// A domain emptied. `culprit` is the propagator that was running, or
    /// `None` when the failure came from a direct domain operation.
    Failed { culprit: Option<PropId> },
}

/// Per-variable observer registry and the propagation queue.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    observers: Vec<Vec<(PropId, PropCondition)>>,
    queue: PropQueue,
    propagations: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` on every subscribed variable.
    ///
    /// A variable listed several times is registered once, under the
    /// widest of its conditions, so degrees count propagators.
    pub(crate) fn subscribe(&mut self, id: PropId, subscriptions: &[Subscription]) {
        for sub in subscriptions {
            let idx = sub.var.index();
            if idx >= self.observers.len() {
                self.observers.resize_with(idx + 1, Vec::new);
            }
            let list = &mut self.observers[idx];
            match list.iter_mut().find(|(p, _)| *p == id) {
                Some((_, cond)) => *cond = (*cond).max(sub.cond),
                None => list.push((id, sub.cond)),
            }
        }
    }

    /// Removes every registration of `id`, so it never wakes again.
    pub(crate) fn cancel(&mut self, id: PropId, subscriptions: &[Subscription]) {
        for sub in subscriptions {
            if let Some(list) = self.observers.get_mut(sub.var.index()) {
                list.retain(|&(p, _)| p != id);
            }
        }
    }

    pub(crate) fn schedule(&mut self, id: PropId, cost: PropCost) {
        self.queue.push(id, cost);
    }

    /// Wakes every propagator whose condition matches one of `events`.
    pub(crate) fn notify(&mut self, events: &[(VarId, ModEvent)], props: &PropSlots) {
        for &(var, event) in events {
            let Some(list) = self.observers.get(var.index()) else {
                continue;
            };
            for &(id, cond) in list {
                if !cond.woken_by(event) {
                    continue;
                }
                if let Some(p) = props[id.0].as_ref() {
                    self.queue.push(id, p.cost());
                }
            }
        }
    }

    /// Runs queued propagators until the queue is empty or a domain fails.
    ///
    /// # Panics
    ///
    /// If a propagator reports success after one of its writes emptied a
    /// domain.
    pub(crate) fn fixpoint(&mut self, store: &mut VarStore, props: &mut PropSlots) -> Fixpoint {
        while let Some(id) = self.queue.pop() {
            let Some(mut prop) = props[id.0].take() else {
                continue;
            };
            self.propagations += 1;

            match prop.propagate(store) {
                Err(failure) => {
                    trace!(event = "propagator_failed", propagator = prop.name(), id = %id, %failure);
                    props[id.0] = Some(prop);
                    store.mark_failed();
                    self.queue.clear();
                    return Fixpoint::Failed { culprit: Some(id) };
                }
                Ok(status) => {
                    assert!(
                        !store.is_failed(),
                        "propagator {} returned {status:?} after emptying a domain",
                        prop.name()
                    );
                    let events = store.drain_events();
                    match status {
                        PropStatus::Fixed => props[id.0] = Some(prop),
                        PropStatus::Subsumed => {
                            debug!(event = "propagator_subsumed", propagator = prop.name(), id = %id);
                            self.cancel(id, &prop.subscriptions());
                        }
                    }
                    self.notify(&events, props);
                }
            }
        }
        Fixpoint::Stable
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
    }

    /// Number of propagators waiting.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of propagator runs so far.
    pub fn propagations(&self) -> u64 {
        self.propagations
    }

    /// Number of live propagators registered on `var` (its degree).
    pub fn degree(&self, var: VarId) -> usize {
        self.observers.get(var.index()).map_or(0, Vec::len)
    }

    /// Propagators registered on `var`.
    pub fn observers(&self, var: VarId) -> impl Iterator<Item = PropId> + '_ {
        self.observers
            .get(var.index())
            .into_iter()
            .flatten()
            .map(|&(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::PropResult;
    use crate::propagators::{Linear, Relation};

    #[test]
    fn test_queue_deduplicates() {
        let mut q = PropQueue::new();
        assert!(q.push(PropId(3), PropCost::Linear));
        assert!(!q.push(PropId(3), PropCost::Linear));
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some(PropId(3)));
        assert!(q.push(PropId(3), PropCost::Linear));
    }

    #[test]
    fn test_queue_cheap_first() {
        let mut q = PropQueue::new();
        q.push(PropId(0), PropCost::Quadratic);
        q.push(PropId(1), PropCost::Linear);
        q.push(PropId(2), PropCost::Unary);
        q.push(PropId(3), PropCost::Linear);
        let order: Vec<usize> = std::iter::from_fn(|| q.pop()).map(PropId::index).collect();
        assert_eq!(order, vec![2, 1, 3, 0]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_queue_clear() {
        let mut q = PropQueue::new();
        q.push(PropId(0), PropCost::Unary);
        q.clear();
        assert!(q.is_empty());
        assert!(q.push(PropId(0), PropCost::Unary));
    }

    /// `y >= x + 1`, bounds only.
    #[derive(Debug, Clone)]
    struct Less {
        x: VarId,
        y: VarId,
    }

    impl Propagator for Less {
        fn name(&self) -> &'static str {
            "less"
        }
        fn subscriptions(&self) -> Vec<Subscription> {
            vec![
                Subscription::new(self.x, PropCondition::Bounds),
                Subscription::new(self.y, PropCondition::Bounds),
            ]
        }
        fn cost(&self) -> PropCost {
            PropCost::Binary
        }
        fn propagate(&mut self, store: &mut VarStore) -> PropResult {
            store.tighten_min(self.y, store.min(self.x) + 1)?;
            store.tighten_max(self.x, store.max(self.y) - 1)?;
            if store.max(self.x) < store.min(self.y) {
                Ok(PropStatus::Subsumed)
            } else {
                Ok(PropStatus::Fixed)
            }
        }
        fn box_clone(&self) -> Box<dyn Propagator> {
            Box::new(self.clone())
        }
    }

    fn chain(n: usize, max: i64) -> (VarStore, PropSlots, Scheduler, Vec<VarId>) {
        let mut store = VarStore::new();
        let vars: Vec<VarId> = (0..n).map(|_| store.push(0, max)).collect();
        let mut props: PropSlots = Vec::new();
        let mut sched = Scheduler::new();
        for w in vars.windows(2) {
            let p = Less { x: w[0], y: w[1] };
            let id = PropId(props.len());
            sched.subscribe(id, &p.subscriptions());
            sched.schedule(id, p.cost());
            props.push(Some(Box::new(p)));
        }
        (store, props, sched, vars)
    }

    #[test]
    fn test_chain_reaches_fixpoint() {
        let (mut store, mut props, mut sched, vars) = chain(4, 10);
        assert_eq!(sched.fixpoint(&mut store, &mut props), Fixpoint::Stable);
        assert_eq!(store.min(vars[3]), 3);
        assert_eq!(store.max(vars[0]), 7);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_chain_fails_when_too_tight() {
        let (mut store, mut props, mut sched, _) = chain(4, 2);
        assert!(matches!(
            sched.fixpoint(&mut store, &mut props),
            Fixpoint::Failed { culprit: Some(_) }
        ));
        assert!(store.is_failed());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_repeated_variable_registers_once() {
        let mut store = VarStore::new();
        let e = store.push(0, 9);
        let n = store.push(0, 9);
        let mut sched = Scheduler::new();
        let p = Linear::new(&[100, 1, -10], &[e, e, e], Relation::Le, 50).unwrap();
        let q = Linear::new(&[1, 1], &[e, n], Relation::Le, 50).unwrap();
        sched.subscribe(PropId(0), &p.subscriptions());
        sched.subscribe(PropId(1), &q.subscriptions());

        assert_eq!(sched.degree(e), 2);
        assert_eq!(sched.degree(n), 1);
        assert_eq!(sched.observers(e).collect::<Vec<_>>(), vec![PropId(0), PropId(1)]);

        sched.cancel(PropId(0), &p.subscriptions());
        assert_eq!(sched.degree(e), 1);
    }

    #[test]
    fn test_repeated_variable_keeps_widest_condition() {
        let mut store = VarStore::new();
        let x = store.push(0, 9);
        let p = Less { x, y: x };
        let props: PropSlots = vec![Some(Box::new(p))];
        let mut sched = Scheduler::new();
        sched.subscribe(
            PropId(0),
            &[
                Subscription::new(x, PropCondition::Assigned),
                Subscription::new(x, PropCondition::Bounds),
                Subscription::new(x, PropCondition::Assigned),
            ],
        );
        assert_eq!(sched.degree(x), 1);

        store.tighten_max(x, 5).unwrap();
        let events = store.drain_events();
        sched.notify(&events, &props);
        assert_eq!(sched.pending(), 1);
    }

    /// Writes past the upper bound, ignores the failure and claims success.
    #[derive(Debug, Clone)]
    struct Careless {
        x: VarId,
    }

    impl Propagator for Careless {
        fn name(&self) -> &'static str {
            "careless"
        }
        fn subscriptions(&self) -> Vec<Subscription> {
            vec![Subscription::new(self.x, PropCondition::Bounds)]
        }
        fn cost(&self) -> PropCost {
            PropCost::Unary
        }
        fn propagate(&mut self, store: &mut VarStore) -> PropResult {
            let _ = store.tighten_min(self.x, store.max(self.x) + 1);
            Ok(PropStatus::Fixed)
        }
        fn box_clone(&self) -> Box<dyn Propagator> {
            Box::new(self.clone())
        }
    }

    #[test]
    #[should_panic(expected = "after emptying a domain")]
    fn test_swallowed_failure_is_not_absorbed() {
        let mut store = VarStore::new();
        let x = store.push(0, 3);
        let p = Careless { x };
        let mut props: PropSlots = vec![Some(Box::new(p.clone()))];
        let mut sched = Scheduler::new();
        sched.subscribe(PropId(0), &p.subscriptions());
        sched.schedule(PropId(0), p.cost());
        sched.fixpoint(&mut store, &mut props);
    }

    #[test]
    fn test_subsumed_propagator_is_unsubscribed() {
        let mut store = VarStore::new();
        let x = store.push(0, 1);
        let y = store.push(5, 9);
        let p = Less { x, y };
        let mut props: PropSlots = vec![Some(Box::new(p.clone()))];
        let mut sched = Scheduler::new();
        sched.subscribe(PropId(0), &p.subscriptions());
        sched.schedule(PropId(0), p.cost());

        assert_eq!(sched.fixpoint(&mut store, &mut props), Fixpoint::Stable);
        assert!(props[0].is_none());
        assert_eq!(sched.degree(x), 0);
        assert_eq!(sched.degree(y), 0);

        store.tighten_min(y, 6).unwrap();
        let events = store.drain_events();
        sched.notify(&events, &props);
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.propagations(), 1);
    }
}
