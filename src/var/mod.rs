//! Finite-domain integer variables.
//!
//! - [`IntVar`]: a domain as a list of disjoint ranges, with mutators that
//!   report a [`ModEvent`] or a [`DomainFailure`]
//! - [`VarStore`]: all domains of one space, logging every event
//! - [`Matrix`]: row-major 2D addressing for grid puzzles
//! - [`limits`]: the value range every bound and parameter must respect

mod array;
mod domain;
pub mod limits;
mod store;

pub use array::Matrix;
pub use domain::{DomainFailure, IntVar, ModEvent, Mutation};
pub use store::{VarId, VarStore};
