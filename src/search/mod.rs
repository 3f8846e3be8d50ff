//! Depth-first search.
//!
//! [`Dfs`] enumerates the solutions of a space by propagating, branching
//! and backtracking over an explicit stack of cloned spaces.
//! [`SearchRunner`] drives it under a [`SearchConfig`] and reports
//! [`SearchStats`] together with the [`StopReason`].
//!
//! # References
//!
//! - Schulte (1999), "Comparing Trailing and Copying for Constraint
//!   Programming"

mod config;
mod dfs;
mod runner;
mod types;

pub use config::SearchConfig;
pub use dfs::Dfs;
pub use runner::{SearchResult, SearchRunner};
pub use types::{SearchStats, StopReason};
