//! Accumulated failure counts.

use crate::error::{CpError, Result};
use crate::propagation::{PropId, Scheduler};
use crate::var::VarId;

/// Search-wide record of which propagators caused failures.
///
/// Every propagator starts with weight 1. On each failure all weights are
/// multiplied by `decay` and the failing propagator gains 1, so recent
/// failures count more when `decay < 1`. The history belongs to the search
/// engine, not to a space: it must survive backtracking.
///
/// # References
///
/// Boussemart, Hemery, Lecoutre & Sais (2004), "Boosting Systematic Search
/// by Weighting Constraints"
#[derive(Debug, Clone)]
pub struct FailureHistory {
    weights: Vec<f64>,
    decay: f64,
    failures: u64,
}

impl FailureHistory {
    /// History for `propagators` propagator slots.
    ///
    /// `decay` must lie in `(0, 1]`; 1 disables decay.
    pub fn new(decay: f64, propagators: usize) -> Result<Self> {
        if !(decay > 0.0 && decay <= 1.0) {
            return Err(CpError::InvalidConfig(format!(
                "afc decay must be in (0, 1], got {decay}"
            )));
        }
        Ok(Self {
            weights: vec![1.0; propagators],
            decay,
            failures: 0,
        })
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Number of failures recorded.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Current weight of `prop`.
    pub fn weight(&self, prop: PropId) -> f64 {
        self.weights.get(prop.index()).copied().unwrap_or(1.0)
    }

    /// Charges a failure to `prop`.
    pub fn record_failure(&mut self, prop: PropId) {
        if prop.index() >= self.weights.len() {
            self.weights.resize(prop.index() + 1, 1.0);
        }
        if self.decay < 1.0 {
            for w in &mut self.weights {
                *w *= self.decay;
            }
        }
        self.weights[prop.index()] += 1.0;
        self.failures += 1;
    }

    /// Sum of the weights of the live propagators registered on `var`.
    pub fn var_afc(&self, scheduler: &Scheduler, var: VarId) -> f64 {
        scheduler.observers(var).map(|p| self.weight(p)).sum()
    }
}
