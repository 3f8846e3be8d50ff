//! Binary choices produced by branchers.

use crate::var::VarId;
use std::fmt;

/// One side of a binary choice: a unary constraint on the chosen variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alternative {
    /// `x <= v`
    Le(i64),
    /// `x > v`
    Gt(i64),
    /// `x = v`
    Eq(i64),
    /// `x != v`
    Ne(i64),
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alternative::Le(v) => write!(f, "<= {v}"),
            Alternative::Gt(v) => write!(f, "> {v}"),
            Alternative::Eq(v) => write!(f, "= {v}"),
            Alternative::Ne(v) => write!(f, "!= {v}"),
        }
    }
}

/// A decision on `var` with exactly two alternatives.
///
/// The alternatives partition the domain of `var` at the time the choice
/// was made, so exploring both loses no solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Choice {
    pub var: VarId,
    alternatives: [Alternative; 2],
}

impl Choice {
    pub fn new(var: VarId, first: Alternative, second: Alternative) -> Self {
        Self {
            var,
            alternatives: [first, second],
        }
    }

    /// Number of alternatives (always 2).
    pub fn alternatives(&self) -> usize {
        self.alternatives.len()
    }

    /// The alternative at position `alt`.
    ///
    /// # Panics
    ///
    /// If `alt > 1`.
    pub fn alternative(&self, alt: usize) -> Alternative {
        assert!(alt < 2, "choice has two alternatives, got index {alt}");
        self.alternatives[alt]
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = self.alternatives;
        write!(f, "{} {a} | {} {b}", self.var, self.var)
    }
}
