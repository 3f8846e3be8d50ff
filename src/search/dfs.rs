//! Depth-first search as a solution enumerator.

use super::config::SearchConfig;
use super::types::{SearchStats, StopReason};
use crate::branch::{Choice, FailureHistory};
use crate::error::Result;
use crate::space::{Space, SpaceStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// A decision point whose second alternative is still unexplored.
#[derive(Debug)]
struct Frame {
    space: Space,
    choice: Choice,
    depth: usize,
}

/// Depth-first search over a space tree.
///
/// The engine keeps an explicit stack of frames, so tree depth is bounded
/// by memory rather than the call stack. Each decision clones the space
/// once: the clone explores the first alternative right away, the
/// original waits on the stack for the second. Iterating yields solved
/// spaces in depth-first, left-to-right order; dropping the iterator
/// abandons the rest of the tree.
///
/// # Examples
///
/// ```
/// use u_cpsolve::search::{Dfs, SearchConfig};
/// use u_cpsolve::space::Space;
///
/// let mut space = Space::new();
/// let x = space.int_vars(3, 0, 2).unwrap();
/// space.distinct(&x).unwrap();
///
/// let dfs = Dfs::new(space, &SearchConfig::default()).unwrap();
/// let leading: Vec<i64> = dfs.map(|s| s.val(x[0]).unwrap()).collect();
/// assert_eq!(leading, vec![0, 0, 1, 1, 2, 2]);
/// ```
#[derive(Debug)]
pub struct Dfs {
    stack: Vec<Frame>,
    current: Option<(Space, usize)>,
    afc: FailureHistory,
    stats: SearchStats,
    node_limit: u64,
    fail_limit: u64,
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
    started: Instant,
    stop: Option<StopReason>,
}

impl Dfs {
    /// Prepares a search rooted at `root`.
    pub fn new(root: Space, config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        let afc = FailureHistory::new(config.afc_decay, root.propagator_count())?;
        let started = Instant::now();
        let deadline = (config.time_limit_ms > 0)
            .then(|| started + Duration::from_millis(config.time_limit_ms));
        Ok(Self {
            stack: Vec::new(),
            current: Some((root, 0)),
            afc,
            stats: SearchStats::default(),
            node_limit: config.node_limit,
            fail_limit: config.fail_limit,
            deadline,
            cancel: None,
            started,
            stop: None,
        })
    }

    /// Stops the search as soon as `flag` becomes `true`.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Counters so far.
    pub fn stats(&self) -> SearchStats {
        let mut stats = self.stats.clone();
        stats.elapsed_ms = self.started.elapsed().as_millis() as u64;
        stats
    }

    /// Why the search stopped, once it has.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    /// Failure counts accumulated by this search.
    pub fn failure_history(&self) -> &FailureHistory {
        &self.afc
    }

    /// Number of decisions waiting for their second alternative.
    pub fn open_frames(&self) -> usize {
        self.stack.len()
    }

    fn limit_reached(&self) -> Option<StopReason> {
        if let Some(ref flag) = self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Some(StopReason::Cancelled);
            }
        }
        if self.node_limit > 0 && self.stats.nodes >= self.node_limit {
            return Some(StopReason::NodeLimit);
        }
        if self.fail_limit > 0 && self.stats.failures >= self.fail_limit {
            return Some(StopReason::FailLimit);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(StopReason::TimeLimit);
        }
        None
    }

    fn halt(&mut self, reason: StopReason) {
        self.stop = Some(reason);
        self.stack.clear();
        self.current = None;
    }

    /// Next node to explore: the pending first alternative, or the second
    /// alternative of the most recent open decision.
    fn next_node(&mut self) -> Option<(Space, usize)> {
        if let Some(node) = self.current.take() {
            return Some(node);
        }
        loop {
            let Frame {
                mut space,
                choice,
                depth,
            } = self.stack.pop()?;
            trace!(event = "backtrack", depth, choice = %choice);
            if space.commit(&choice, 1).is_ok() {
                return Some((space, depth + 1));
            }
            self.stats.failures += 1;
        }
    }
}

impl Iterator for Dfs {
    type Item = Space;

    fn next(&mut self) -> Option<Space> {
        if self.stop.is_some() {
            return None;
        }
        loop {
            if self.current.is_none() && self.stack.is_empty() {
                self.halt(StopReason::Exhausted);
                return None;
            }
            if let Some(reason) = self.limit_reached() {
                debug!(event = "search_limit", reason = %reason, nodes = self.stats.nodes);
                self.halt(reason);
                return None;
            }
            let Some((mut space, depth)) = self.next_node() else {
                continue;
            };

            self.stats.nodes += 1;
            self.stats.max_depth = self.stats.max_depth.max(depth);
            let before = space.propagations();
            let status = space.status();
            self.stats.propagations += space.propagations() - before;

            match status {
                SpaceStatus::Failed => {
                    self.stats.failures += 1;
                    if let Some(culprit) = space.failed_by() {
                        self.afc.record_failure(culprit);
                    }
                    trace!(event = "fail", depth, culprit = ?space.failed_by());
                }
                SpaceStatus::Solved => {
                    self.stats.solutions += 1;
                    debug!(event = "solution", n = self.stats.solutions, depth, nodes = self.stats.nodes);
                    return Some(space);
                }
                SpaceStatus::Stable => {
                    let Some(choice) = space.choose(&self.afc) else {
                        self.stats.solutions += 1;
                        return Some(space);
                    };
                    trace!(event = "branch", depth, choice = %choice);
                    let mut first = space.clone();
                    self.stack.push(Frame {
                        space,
                        choice,
                        depth,
                    });
                    if first.commit(&choice, 0).is_ok() {
                        self.current = Some((first, depth + 1));
                    } else {
                        self.stats.failures += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::{BranchConfig, ValSelection, VarSelection};
    use crate::propagators::Relation;
    use crate::var::VarId;

    fn permutations(n: usize) -> (Space, Vec<VarId>) {
        let mut space = Space::new();
        let x = space.int_vars(n, 0, n as i64 - 1).unwrap();
        space.distinct(&x).unwrap();
        space.branch(&x, BranchConfig::default()).unwrap();
        (space, x)
    }

    #[test]
    fn test_enumerates_in_lexicographic_order() {
        let (space, x) = permutations(3);
        let mut dfs = Dfs::new(space, &SearchConfig::default()).unwrap();
        let solutions: Vec<Vec<i64>> = dfs.by_ref().map(|s| s.values(&x).unwrap()).collect();
        assert_eq!(
            solutions,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
        assert_eq!(dfs.stop_reason(), Some(StopReason::Exhausted));
        assert_eq!(dfs.stats().solutions, 6);
        assert_eq!(dfs.open_frames(), 0);
    }

    #[test]
    fn test_infeasible_root() {
        let mut space = Space::new();
        let x = space.int_vars(3, 0, 1).unwrap();
        space.distinct(&x).unwrap();
        let mut dfs = Dfs::new(space, &SearchConfig::default()).unwrap();
        assert!(dfs.next().is_none());
        assert_eq!(dfs.stop_reason(), Some(StopReason::Exhausted));
        assert!(dfs.stats().failures > 0);
    }

    #[test]
    fn test_solved_root_yields_once() {
        let mut space = Space::new();
        let x = space.int_var(2, 2).unwrap();
        let mut dfs = Dfs::new(space, &SearchConfig::default()).unwrap();
        assert_eq!(dfs.next().and_then(|s| s.val(x)), Some(2));
        assert!(dfs.next().is_none());
        assert_eq!(dfs.stats().nodes, 1);
        assert_eq!(dfs.stats().max_depth, 0);
    }

    #[test]
    fn test_resumes_after_solution() {
        let (space, x) = permutations(4);
        let mut dfs = Dfs::new(space, &SearchConfig::default()).unwrap();
        let first = dfs.next().unwrap();
        assert_eq!(first.values(&x), Some(vec![0, 1, 2, 3]));
        assert!(dfs.open_frames() > 0);
        assert_eq!(dfs.count(), 23);
    }

    #[test]
    fn test_node_limit() {
        let (space, _) = permutations(5);
        let config = SearchConfig::default().with_node_limit(3);
        let mut dfs = Dfs::new(space, &config).unwrap();
        while dfs.next().is_some() {}
        assert_eq!(dfs.stop_reason(), Some(StopReason::NodeLimit));
        assert_eq!(dfs.stats().nodes, 3);
    }

    #[test]
    fn test_fail_limit() {
        // Three pairwise different values cannot sum to 2.
        let mut space = Space::new();
        let x = space.int_vars(3, 0, 4).unwrap();
        space.rel(x[0], Relation::Ne, x[1]).unwrap();
        space.rel(x[1], Relation::Ne, x[2]).unwrap();
        space.rel(x[0], Relation::Ne, x[2]).unwrap();
        space.sum(&x, Relation::Eq, 2).unwrap();
        space
            .branch(&x, BranchConfig::new(VarSelection::Lexicographic, ValSelection::Min))
            .unwrap();
        let config = SearchConfig::default().with_fail_limit(1);
        let mut dfs = Dfs::new(space, &config).unwrap();
        assert!(dfs.next().is_none());
        assert_eq!(dfs.stop_reason(), Some(StopReason::FailLimit));
        assert_eq!(dfs.stats().failures, 1);
    }

    #[test]
    fn test_cancelled_before_start() {
        let (space, _) = permutations(3);
        let flag = Arc::new(AtomicBool::new(true));
        let mut dfs = Dfs::new(space, &SearchConfig::default())
            .unwrap()
            .with_cancel(flag);
        assert!(dfs.next().is_none());
        assert_eq!(dfs.stop_reason(), Some(StopReason::Cancelled));
        assert_eq!(dfs.stats().nodes, 0);
    }

    #[test]
    fn test_invalid_config() {
        let config = SearchConfig::default().with_afc_decay(2.0);
        assert!(Dfs::new(Space::new(), &config).is_err());
    }

    #[test]
    fn test_afc_records_failures() {
        let mut space = Space::new();
        let x = space.int_vars(4, 0, 2).unwrap();
        let id = space.distinct(&x).unwrap().unwrap();
        space
            .branch(&x, BranchConfig::new(VarSelection::AfcMax, ValSelection::Min))
            .unwrap();
        let mut dfs = Dfs::new(space, &SearchConfig::default()).unwrap();
        assert!(dfs.next().is_none());
        let failures = dfs.stats().failures;
        assert!(failures > 0);
        assert_eq!(dfs.failure_history().failures(), failures);
        assert!((dfs.failure_history().weight(id) - (1.0 + failures as f64)).abs() < 1e-9);
    }
}
