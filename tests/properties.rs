//! Property-based tests for propagation and search.

use proptest::prelude::*;
use u_cpsolve::propagators::Relation;
use u_cpsolve::search::{SearchConfig, SearchRunner};
use u_cpsolve::space::{Space, SpaceStatus};
use u_cpsolve::var::VarId;

// ============================================================================
// Helpers
// ============================================================================

/// A domain operation: (variable index, kind, value).
type Op = (usize, u8, i64);

fn op_strategy(vars: usize) -> impl Strategy<Value = Op> {
    (0..vars, 0u8..4, -1i64..12)
}

fn apply(space: &mut Space, vars: &[VarId], (i, kind, v): Op) {
    let x = vars[i];
    let _ = match kind {
        0 => space.tighten_min(x, v),
        1 => space.tighten_max(x, v),
        2 => space.exclude(x, v),
        _ => space.rel_const(x, Relation::Ne, v / 2),
    };
}

/// Four variables over 0..=10 tied by a sum, a distinct and an ordering.
fn model() -> (Space, Vec<VarId>) {
    let mut space = Space::new();
    let x = space.int_vars(4, 0, 10).unwrap();
    space.sum(&x, Relation::Le, 20).unwrap();
    space.distinct(&x[1..]).unwrap();
    space.rel(x[0], Relation::Lt, x[3]).unwrap();
    (space, x)
}

fn snapshot(space: &Space, vars: &[VarId]) -> Vec<String> {
    vars.iter().map(|&x| space.var(x).to_string()).collect()
}

fn overlaps(a: (i64, i64, i64, i64), b: (i64, i64, i64, i64)) -> bool {
    let (ax, ay, aw, ah) = a;
    let (bx, by, bw, bh) = b;
    ax < bx + bw && bx < ax + aw && ay < by + bh && by < ay + ah
}

/// Number of non-overlapping placements with every corner in `0..=max`.
fn brute_force_count(sizes: &[(i64, i64)], max: i64) -> usize {
    fn place(sizes: &[(i64, i64)], max: i64, placed: &mut Vec<(i64, i64, i64, i64)>) -> usize {
        let Some(&(w, h)) = sizes.get(placed.len()) else {
            return 1;
        };
        let mut count = 0;
        for x in 0..=max {
            for y in 0..=max {
                let r = (x, y, w, h);
                if placed.iter().all(|&p| !overlaps(p, r)) {
                    placed.push(r);
                    count += place(sizes, max, placed);
                    placed.pop();
                }
            }
        }
        count
    }
    place(sizes, max, &mut Vec::new())
}

// ============================================================================
// Propagation properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn bounds_only_move_inwards(ops in prop::collection::vec(op_strategy(4), 1..20)) {
        let (mut space, x) = model();
        let mut bounds: Vec<(i64, i64)> = x.iter().map(|&v| (space.min(v), space.max(v))).collect();
        for op in ops {
            apply(&mut space, &x, op);
            if space.status() == SpaceStatus::Failed {
                break;
            }
            for (i, &v) in x.iter().enumerate() {
                let (lo, hi) = bounds[i];
                prop_assert!(space.min(v) >= lo);
                prop_assert!(space.max(v) <= hi);
                bounds[i] = (space.min(v), space.max(v));
            }
        }
    }

    #[test]
    fn status_is_idempotent(ops in prop::collection::vec(op_strategy(4), 0..10)) {
        let (mut space, x) = model();
        for op in ops {
            apply(&mut space, &x, op);
        }
        let first = space.status();
        prop_assume!(first != SpaceStatus::Failed);

        let before = snapshot(&space, &x);
        let runs = space.propagations();
        prop_assert_eq!(space.status(), first);
        prop_assert_eq!(snapshot(&space, &x), before);
        prop_assert_eq!(space.propagations(), runs);
    }

    #[test]
    fn clones_do_not_share_state(ops in prop::collection::vec(op_strategy(4), 1..10)) {
        let (mut space, x) = model();
        prop_assume!(space.status() != SpaceStatus::Failed);
        let before = snapshot(&space, &x);

        let mut copy = space.clone();
        for op in ops {
            apply(&mut copy, &x, op);
            if copy.status() == SpaceStatus::Failed {
                break;
            }
        }
        prop_assert_eq!(snapshot(&space, &x), before);
        prop_assert_eq!(space.status(), SpaceStatus::Stable);
    }
}

// ============================================================================
// NoOverlap properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn no_overlap_enumerates_exactly_the_valid_placements(
        sizes in prop::collection::vec((1i64..=3, 1i64..=3), 1..=3)
    ) {
        const MAX: i64 = 3;
        let mut space = Space::new();
        let n = sizes.len();
        let x = space.int_vars(n, 0, MAX).unwrap();
        let y = space.int_vars(n, 0, MAX).unwrap();
        let w: Vec<i64> = sizes.iter().map(|s| s.0).collect();
        let h: Vec<i64> = sizes.iter().map(|s| s.1).collect();
        space.no_overlap(&x, &w, &y, &h).unwrap();

        let result = SearchRunner::run(space, &SearchConfig::default()).unwrap();
        prop_assert!(result.is_exhausted());

        for s in &result.solutions {
            let rects: Vec<_> = (0..n)
                .map(|i| (s.val(x[i]).unwrap(), s.val(y[i]).unwrap(), w[i], h[i]))
                .collect();
            for a in 0..n {
                for b in a + 1..n {
                    prop_assert!(!overlaps(rects[a], rects[b]), "{:?} overlaps {:?}", rects[a], rects[b]);
                }
            }
        }
        prop_assert_eq!(result.solutions.len(), brute_force_count(&sizes, MAX));
    }

    #[test]
    fn search_is_deterministic(sizes in prop::collection::vec((1i64..=2, 1i64..=2), 2..=3)) {
        let run = || {
            let mut space = Space::new();
            let n = sizes.len();
            let x = space.int_vars(n, 0, 2).unwrap();
            let y = space.int_vars(n, 0, 2).unwrap();
            let w: Vec<i64> = sizes.iter().map(|s| s.0).collect();
            let h: Vec<i64> = sizes.iter().map(|s| s.1).collect();
            space.no_overlap(&x, &w, &y, &h).unwrap();
            let all: Vec<VarId> = x.iter().chain(&y).copied().collect();
            let result = SearchRunner::run(space, &SearchConfig::default()).unwrap();
            let values: Vec<Vec<i64>> = result
                .solutions
                .iter()
                .filter_map(|s| s.values(&all))
                .collect();
            (values, result.stats.nodes)
        };
        prop_assert_eq!(run(), run());
    }
}
