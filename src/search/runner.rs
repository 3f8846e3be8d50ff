//! Search driver: collects solutions under the configured limits.

use super::config::SearchConfig;
use super::dfs::Dfs;
use super::types::{SearchStats, StopReason};
use crate::error::Result;
use crate::space::Space;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Solved spaces in the order they were found.
    pub solutions: Vec<Space>,

    /// Counters for the whole run.
    pub stats: SearchStats,

    /// Why the search stopped.
    pub stop: StopReason,
}

impl SearchResult {
    /// The first solution found, if any.
    pub fn first(&self) -> Option<&Space> {
        self.solutions.first()
    }

    pub fn is_solution_found(&self) -> bool {
        !self.solutions.is_empty()
    }

    /// Whether the tree was fully explored, so `solutions` is complete.
    pub fn is_exhausted(&self) -> bool {
        self.stop.is_complete()
    }
}

/// Runs depth-first search to completion or to the first limit hit.
pub struct SearchRunner;

impl SearchRunner {
    /// Searches `root` under `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_cpsolve::propagators::Relation;
    /// use u_cpsolve::search::{SearchConfig, SearchRunner, StopReason};
    /// use u_cpsolve::space::Space;
    ///
    /// let mut space = Space::new();
    /// let x = space.int_vars(2, 0, 3).unwrap();
    /// space.sum(&x, Relation::Eq, 3).unwrap();
    ///
    /// let result = SearchRunner::run(space, &SearchConfig::default()).unwrap();
    /// assert_eq!(result.solutions.len(), 4);
    /// assert_eq!(result.stop, StopReason::Exhausted);
    /// ```
    pub fn run(root: Space, config: &SearchConfig) -> Result<SearchResult> {
        Self::run_with_cancel(root, config, None)
    }

    /// Searches with an optional cancellation token.
    pub fn run_with_cancel(
        root: Space,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SearchResult> {
        info!(
            event = "search_start",
            vars = root.var_count(),
            propagators = root.propagator_count(),
            solution_limit = config.solution_limit,
            node_limit = config.node_limit,
            fail_limit = config.fail_limit,
            time_limit_ms = config.time_limit_ms
        );

        let mut dfs = Dfs::new(root, config)?;
        if let Some(flag) = cancel {
            dfs = dfs.with_cancel(flag);
        }

        let mut solutions = Vec::new();
        let mut stop = None;
        for solution in dfs.by_ref() {
            solutions.push(solution);
            if config.solution_limit > 0 && solutions.len() >= config.solution_limit {
                stop = Some(StopReason::SolutionLimit);
                break;
            }
        }
        let stop = stop.or(dfs.stop_reason()).unwrap_or(StopReason::Exhausted);
        let stats = dfs.stats();

        info!(
            event = "search_end",
            stop = %stop,
            solutions = stats.solutions,
            nodes = stats.nodes,
            failures = stats.failures,
            propagations = stats.propagations,
            max_depth = stats.max_depth,
            elapsed_ms = stats.elapsed_ms
        );

        Ok(SearchResult {
            solutions,
            stats,
            stop,
        })
    }

    /// First solution only, or `None` if the search ends without one.
    pub fn first(root: Space, config: &SearchConfig) -> Result<Option<Space>> {
        let config = config.clone().with_solution_limit(1);
        let result = Self::run(root, &config)?;
        Ok(result.solutions.into_iter().next())
    }
}
