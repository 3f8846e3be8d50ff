//! Search statistics and termination reasons.

use std::fmt;

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The whole tree was explored.
    Exhausted,
    /// The requested number of solutions was found.
    SolutionLimit,
    NodeLimit,
    FailLimit,
    TimeLimit,
    /// The cancellation flag was raised.
    Cancelled,
}

impl StopReason {
    /// Whether the search proved there are no further solutions.
    pub fn is_complete(self) -> bool {
        self == StopReason::Exhausted
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::Exhausted => "exhausted",
            StopReason::SolutionLimit => "solution limit",
            StopReason::NodeLimit => "node limit",
            StopReason::FailLimit => "fail limit",
            StopReason::TimeLimit => "time limit",
            StopReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Counters collected during search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Spaces whose status was computed.
    pub nodes: u64,
    /// Nodes that failed.
    pub failures: u64,
    /// Solutions yielded.
    pub solutions: u64,
    /// Propagator runs over all nodes.
    pub propagations: u64,
    /// Deepest decision level reached (root = 0).
    pub max_depth: usize,
    /// Wall-clock time in milliseconds.
    pub elapsed_ms: u64,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes: {}, failures: {}, solutions: {}, propagations: {}, depth: {}, time: {} ms",
            self.nodes,
            self.failures,
            self.solutions,
            self.propagations,
            self.max_depth,
            self.elapsed_ms
        )
    }
}
