//! Finite-domain constraint propagation and depth-first search.
//!
//! Provides a small constraint programming kernel for combinatorial
//! puzzles:
//!
//! - **Variables** ([`var`]): integer domains kept as ordered range lists,
//!   with modification events classifying every change.
//! - **Propagation** ([`propagation`]): the `Propagator` capability trait
//!   and a cost-ordered fixpoint scheduler driven by per-variable
//!   subscriptions.
//! - **Propagators** ([`propagators`]): rectangle non-overlap, linear
//!   relations, pairwise distinct.
//! - **Space** ([`space`]): one search node; deep `Clone` gives fully
//!   independent copies.
//! - **Branching** ([`branch`]): variable/value heuristics including
//!   degree and accumulated-failure-count based ones.
//! - **Search** ([`search`]): depth-first enumeration over an explicit
//!   stack with node, failure, time and solution limits.
//! - **Puzzles** ([`puzzles`]): n-queens, sudoku and square packing models.
//!
//! # Architecture
//!
//! Models create variables and post propagators into a [`space::Space`].
//! Search repeatedly propagates to a fixpoint, stops on failure or a full
//! assignment, and otherwise asks the branchers for a binary choice,
//! cloning the space to explore both alternatives in order.

pub mod branch;
pub mod error;
pub mod propagation;
pub mod propagators;
pub mod puzzles;
pub mod search;
pub mod space;
pub mod var;

pub use error::{CpError, Result};
