//! Variable/value selection over an array of variables.

use super::afc::FailureHistory;
use super::choice::{Alternative, Choice};
use super::config::{BranchConfig, ValSelection, VarSelection};
use crate::propagation::Scheduler;
use crate::var::{VarId, VarStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_SEED: u64 = 42;

/// A registered branching: an array of variables plus the heuristics used
/// to pick among them.
///
/// Branchers are cloned with the space that owns them, including the state
/// of the random generator, so a given search replays deterministically.
#[derive(Debug, Clone)]
pub struct Brancher {
    vars: Vec<VarId>,
    config: BranchConfig,
    rng: StdRng,
}

impl Brancher {
    pub fn new(vars: Vec<VarId>, config: BranchConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
        Self { vars, config, rng }
    }

    pub fn vars(&self) -> &[VarId] {
        &self.vars
    }

    pub fn config(&self) -> BranchConfig {
        self.config
    }

    /// Whether every variable of this brancher is assigned.
    pub fn done(&self, store: &VarStore) -> bool {
        self.vars.iter().all(|&x| store.assigned(x))
    }

    /// Builds the next choice, or `None` when all variables are assigned.
    pub fn choose(
        &mut self,
        store: &VarStore,
        scheduler: &Scheduler,
        afc: &FailureHistory,
    ) -> Option<Choice> {
        let var = self.select_var(store, scheduler, afc)?;
        Some(self.select_val(store, var))
    }

    fn select_var(
        &mut self,
        store: &VarStore,
        scheduler: &Scheduler,
        afc: &FailureHistory,
    ) -> Option<VarId> {
        let mut open = self.vars.iter().copied().filter(|&x| !store.assigned(x));

        let score: fn(&VarStore, &Scheduler, &FailureHistory, VarId) -> f64 = match self.config.var {
            VarSelection::Lexicographic => return open.next(),
            VarSelection::Random => {
                let candidates: Vec<VarId> = open.collect();
                if candidates.is_empty() {
                    return None;
                }
                return Some(candidates[self.rng.random_range(0..candidates.len())]);
            }
            VarSelection::SizeMin => |s, _, _, x| s.size(x) as f64,
            VarSelection::SizeMax => |s, _, _, x| -(s.size(x) as f64),
            VarSelection::SizeOverDegreeMin => {
                |s, sched, _, x| s.size(x) as f64 / sched.degree(x).max(1) as f64
            }
            VarSelection::SizeOverAfcMin => |s, sched, h, x| {
                let afc = h.var_afc(sched, x);
                if afc > 0.0 {
                    s.size(x) as f64 / afc
                } else {
                    f64::INFINITY
                }
            },
            VarSelection::AfcMax => |_, sched, h, x| -h.var_afc(sched, x),
            VarSelection::MinMin => |s, _, _, x| s.min(x) as f64,
            VarSelection::MinMax => |s, _, _, x| -(s.min(x) as f64),
        };

        let mut best: Option<(VarId, f64)> = None;
        for x in open {
            let value = score(store, scheduler, afc, x);
            // strict comparison keeps the earliest variable on ties
            if best.map_or(true, |(_, b)| value < b) {
                best = Some((x, value));
            }
        }
        best.map(|(x, _)| x)
    }

    fn select_val(&mut self, store: &VarStore, x: VarId) -> Choice {
        let (min, max) = (store.min(x), store.max(x));
        let mid = min + (max - min) / 2;
        match self.config.val {
            ValSelection::SplitMin => Choice::new(x, Alternative::Le(mid), Alternative::Gt(mid)),
            ValSelection::SplitMax => Choice::new(x, Alternative::Gt(mid), Alternative::Le(mid)),
            ValSelection::Min => Choice::new(x, Alternative::Eq(min), Alternative::Ne(min)),
            ValSelection::Max => Choice::new(x, Alternative::Eq(max), Alternative::Ne(max)),
            ValSelection::Random => {
                let v = nth_value(store, x, self.rng.random_range(0..store.size(x)));
                Choice::new(x, Alternative::Eq(v), Alternative::Ne(v))
            }
        }
    }
}

/// The `k`-th smallest value in the domain of `x`.
fn nth_value(store: &VarStore, x: VarId, mut k: u64) -> i64 {
    for &(lo, hi) in store.var(x).ranges() {
        let len = (hi - lo) as u64 + 1;
        if k < len {
            return lo + k as i64;
        }
        k -= len;
    }
    store.max(x)
}
