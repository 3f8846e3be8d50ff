//! Error types for model construction and configuration.
//!
//! Only configuration-time problems surface as [`CpError`]. An empty domain
//! during propagation is routine and travels as
//! [`DomainFailure`](crate::var::DomainFailure) inside the kernel instead.

use crate::var::limits;
use thiserror::Error;

/// Errors raised while building a model or validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpError {
    /// Parallel argument arrays passed to a constraint differ in length.
    #[error("argument size mismatch in {constraint}: {detail}")]
    ArgumentSizeMismatch {
        /// Name of the constraint being posted.
        constraint: &'static str,
        /// Which arrays disagreed.
        detail: String,
    },

    /// A variable was created with `min > max`.
    #[error("empty initial domain [{min}, {max}]")]
    EmptyDomain { min: i64, max: i64 },

    /// A bound or constraint parameter lies outside
    /// [`limits::MIN`]..=[`limits::MAX`].
    #[error("{what} {value} outside [{min}, {max}]", min = limits::MIN, max = limits::MAX)]
    OutOfLimits { what: &'static str, value: i64 },

    /// A variable handle does not belong to the space it was used with.
    #[error("unknown variable #{0}")]
    UnknownVariable(usize),

    /// Invalid search or branching configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A puzzle model was given inconsistent input data.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Result alias for fallible model-construction calls.
pub type Result<T> = std::result::Result<T, CpError>;
