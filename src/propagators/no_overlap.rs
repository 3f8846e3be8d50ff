//! Pairwise non-overlap of axis-aligned rectangles.

use crate::error::{CpError, Result};
use crate::propagation::{
    PropCondition, PropCost, PropResult, PropStatus, Propagator, Subscription,
};
use crate::var::{limits, VarId, VarStore};

/// Rectangles `i` with corner `(x[i], y[i])` and size `w[i] x h[i]` must
/// not overlap.
///
/// Pruning only happens once a rectangle is fully placed: for a pair
/// `(a, u)` with `a < u`, if `a` is assigned on both axes and `u` is
/// assigned on one axis where the two overlap, every position of `u` on
/// the other axis that would overlap `a` is removed. Pairs where only the
/// later rectangle is placed are not pruned; search branching closes that
/// gap. Each call is `O(n²)` in the number of rectangles.
///
/// The propagator is subsumed as soon as every pair is provably separated
/// on at least one axis by the current bounds.
///
/// # Examples
///
/// ```
/// use u_cpsolve::space::{Space, SpaceStatus};
///
/// let mut space = Space::new();
/// let x = vec![space.int_var(0, 0).unwrap(), space.int_var(0, 4).unwrap()];
/// let y = vec![space.int_var(0, 0).unwrap(), space.int_var(1, 1).unwrap()];
/// space.no_overlap(&x, &[3, 2], &y, &[3, 2]).unwrap();
///
/// assert_ne!(space.status(), SpaceStatus::Failed);
/// assert_eq!((space.min(x[1]), space.max(x[1])), (3, 4));
/// ```
#[derive(Debug, Clone)]
pub struct NoOverlap {
    x: Vec<VarId>,
    w: Vec<i64>,
    y: Vec<VarId>,
    h: Vec<i64>,
}

impl NoOverlap {
    /// Builds the propagator after checking that all four arrays agree in
    /// length and every size lies in `0..=`[`limits::MAX`].
    pub fn new(x: Vec<VarId>, w: Vec<i64>, y: Vec<VarId>, h: Vec<i64>) -> Result<Self> {
        if x.len() != w.len() || x.len() != y.len() || y.len() != h.len() {
            return Err(CpError::ArgumentSizeMismatch {
                constraint: "no_overlap",
                detail: format!(
                    "x: {}, widths: {}, y: {}, heights: {}",
                    x.len(),
                    w.len(),
                    y.len(),
                    h.len()
                ),
            });
        }
        for &size in w.iter().chain(&h) {
            limits::check_size(size, "rectangle size")?;
        }
        Ok(Self { x, w, y, h })
    }

    /// Number of rectangles.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Whether the current bounds still allow `a` and `u` to overlap.
    fn possibly_overlapping(&self, store: &VarStore, a: usize, u: usize) -> bool {
        let (xa, xu, ya, yu) = (self.x[a], self.x[u], self.y[a], self.y[u]);
        let right = store.min(xa) >= store.max(xu) + self.w[u];
        let left = store.max(xa) + self.w[a] <= store.min(xu);
        let below = store.min(ya) >= store.max(yu) + self.h[u];
        let above = store.max(ya) + self.h[a] <= store.min(yu);
        !(right || left) && !(below || above)
    }
}

/// Whether `[p, p + len_p)` and `[q, q + len_q)` intersect.
fn intersects(p: i64, len_p: i64, q: i64, len_q: i64) -> bool {
    !(p >= q + len_q) && !(p + len_p <= q)
}

impl Propagator for NoOverlap {
    fn name(&self) -> &'static str {
        "no_overlap"
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        self.x
            .iter()
            .chain(&self.y)
            .map(|&v| Subscription::new(v, PropCondition::Bounds))
            .collect()
    }

    fn cost(&self) -> PropCost {
        PropCost::quadratic(2 * self.x.len())
    }

    fn propagate(&mut self, store: &mut VarStore) -> PropResult {
        let n = self.x.len();
        let mut overlap_possible = false;

        for a in 0..n {
            for u in a + 1..n {
                if self.possibly_overlapping(store, a, u) {
                    overlap_possible = true;
                }

                let (Some(xa), Some(ya)) = (store.val(self.x[a]), store.val(self.y[a])) else {
                    continue;
                };
                let (wa, ha, wu, hu) = (self.w[a], self.h[a], self.w[u], self.h[u]);

                if let Some(yu) = store.val(self.y[u]) {
                    if intersects(ya, ha, yu, hu) {
                        store.exclude_range(self.x[u], xa - wu + 1, xa + wa - 1)?;
                    }
                }
                if let Some(xu) = store.val(self.x[u]) {
                    if intersects(xa, wa, xu, wu) {
                        store.exclude_range(self.y[u], ya - hu + 1, ya + ha - 1)?;
                    }
                }
            }
        }

        if overlap_possible {
            Ok(PropStatus::Fixed)
        } else {
            Ok(PropStatus::Subsumed)
        }
    }

    fn box_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}
