//! Branching: how search splits a stable, unsolved space.
//!
//! A [`Brancher`] owns an array of variables and a [`BranchConfig`]. When
//! asked, it picks an unassigned variable and produces a binary
//! [`Choice`] whose two alternatives partition the variable's domain.
//! Heuristics based on failure counts read a [`FailureHistory`] that the
//! search engine keeps across backtracking.

mod afc;
mod brancher;
mod choice;
mod config;

pub use afc::FailureHistory;
pub use brancher::Brancher;
pub use choice::{Alternative, Choice};
pub use config::{BranchConfig, ValSelection, VarSelection};
