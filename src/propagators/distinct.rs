//! All-different with value consistency.

use crate::propagation::{
    PropCondition, PropCost, PropResult, PropStatus, Propagator, Subscription,
};
use crate::var::{VarId, VarStore};

/// Pairwise distinct values.
///
/// Wakes on assignments only and removes each assigned value from every
/// other variable. Two variables assigned the same value fail the space.
#[derive(Debug, Clone)]
pub struct Distinct {
    vars: Vec<VarId>,
}

impl Distinct {
    pub fn new(vars: Vec<VarId>) -> Self {
        Self { vars }
    }
}

impl Propagator for Distinct {
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        self.vars
            .iter()
            .map(|&x| Subscription::new(x, PropCondition::Assigned))
            .collect()
    }

    fn cost(&self) -> PropCost {
        PropCost::linear(self.vars.len())
    }

    fn propagate(&mut self, store: &mut VarStore) -> PropResult {
        for i in 0..self.vars.len() {
            let Some(v) = store.val(self.vars[i]) else {
                continue;
            };
            for (j, &other) in self.vars.iter().enumerate() {
                if j != i {
                    store.exclude(other, v)?;
                }
            }
        }
        if self.vars.iter().all(|&x| store.assigned(x)) {
            Ok(PropStatus::Subsumed)
        } else {
            Ok(PropStatus::Fixed)
        }
    }

    fn box_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_assigned_values() {
        let mut store = VarStore::new();
        let a = store.push(1, 1);
        let b = store.push(1, 3);
        let c = store.push(1, 3);
        let mut p = Distinct::new(vec![a, b, c]);

        assert_eq!(p.propagate(&mut store), Ok(PropStatus::Fixed));
        assert_eq!(store.min(b), 2);
        assert_eq!(store.min(c), 2);
        assert_eq!(p.subscriptions()[1].cond, PropCondition::Assigned);
    }

    #[test]
    fn test_cascade_to_subsumption() {
        let mut store = VarStore::new();
        let a = store.push(1, 1);
        let b = store.push(1, 2);
        let c = store.push(1, 3);
        let mut p = Distinct::new(vec![a, b, c]);

        // a = 1 fixes b = 2, which is seen later in the same sweep.
        assert_eq!(p.propagate(&mut store), Ok(PropStatus::Subsumed));
        assert_eq!(store.val(b), Some(2));
        assert_eq!(store.val(c), Some(3));
    }

    #[test]
    fn test_duplicate_assignment_fails() {
        let mut store = VarStore::new();
        let a = store.push(4, 4);
        let b = store.push(4, 4);
        let mut p = Distinct::new(vec![a, b]);
        assert!(p.propagate(&mut store).is_err());
    }
}
