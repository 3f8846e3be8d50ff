//! Branching heuristics and their configuration.

use crate::error::CpError;
use std::fmt;
use std::str::FromStr;

/// Which unassigned variable to branch on.
///
/// Scores follow the "lower is better" convention; ties go to the
/// variable that comes first in the brancher's array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarSelection {
    /// First unassigned variable in array order.
    #[default]
    Lexicographic,
    /// Fewest remaining values.
    SizeMin,
    /// Most remaining values.
    SizeMax,
    /// Smallest domain size divided by degree (number of live propagators
    /// on the variable). Among equal sizes, the higher degree wins.
    SizeOverDegreeMin,
    /// Smallest domain size divided by accumulated failure count.
    SizeOverAfcMin,
    /// Largest accumulated failure count.
    AfcMax,
    /// Smallest lower bound.
    MinMin,
    /// Largest lower bound.
    MinMax,
    /// Uniformly random unassigned variable (seeded).
    Random,
}

/// How to split the chosen variable into two alternatives.
///
/// The first alternative is always explored first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValSelection {
    /// `x <= mid`, then `x > mid`, with `mid = min + (max - min) / 2`.
    #[default]
    SplitMin,
    /// `x > mid`, then `x <= mid`.
    SplitMax,
    /// `x = min`, then `x != min`.
    Min,
    /// `x = max`, then `x != max`.
    Max,
    /// `x = v`, then `x != v` for a random value `v` of the domain (seeded).
    Random,
}

impl VarSelection {
    /// Short name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            VarSelection::Lexicographic => "none",
            VarSelection::SizeMin => "size",
            VarSelection::SizeMax => "size-max",
            VarSelection::SizeOverDegreeMin => "sizedeg",
            VarSelection::SizeOverAfcMin => "sizeafc",
            VarSelection::AfcMax => "afc",
            VarSelection::MinMin => "min-min",
            VarSelection::MinMax => "min-max",
            VarSelection::Random => "random",
        }
    }

    /// Whether the heuristic reads the search-wide failure history.
    pub fn uses_afc(self) -> bool {
        matches!(self, VarSelection::SizeOverAfcMin | VarSelection::AfcMax)
    }
}

impl fmt::Display for VarSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VarSelection {
    type Err = CpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sel = match s {
            "none" | "lexicographic" => VarSelection::Lexicographic,
            "size" => VarSelection::SizeMin,
            "size-max" => VarSelection::SizeMax,
            "sizedeg" => VarSelection::SizeOverDegreeMin,
            "sizeafc" => VarSelection::SizeOverAfcMin,
            "afc" => VarSelection::AfcMax,
            "min-min" => VarSelection::MinMin,
            "min-max" => VarSelection::MinMax,
            "random" => VarSelection::Random,
            other => {
                return Err(CpError::InvalidConfig(format!(
                    "unknown variable selection '{other}'"
                )))
            }
        };
        Ok(sel)
    }
}

/// A branching registration: heuristic pair plus an optional seed for the
/// random variants.
///
/// # Examples
///
/// ```
/// use u_cpsolve::branch::{BranchConfig, ValSelection, VarSelection};
///
/// let config = BranchConfig::default()
///     .with_var(VarSelection::SizeOverAfcMin)
///     .with_val(ValSelection::Min);
/// assert_eq!(config.var, VarSelection::SizeOverAfcMin);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BranchConfig {
    pub var: VarSelection,
    pub val: ValSelection,
    /// Seed for [`VarSelection::Random`] / [`ValSelection::Random`].
    /// `None` uses a fixed default so runs stay reproducible.
    pub seed: Option<u64>,
}

impl BranchConfig {
    pub fn new(var: VarSelection, val: ValSelection) -> Self {
        Self {
            var,
            val,
            seed: None,
        }
    }

    pub fn with_var(mut self, var: VarSelection) -> Self {
        self.var = var;
        self
    }

    pub fn with_val(mut self, val: ValSelection) -> Self {
        self.val = val;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
