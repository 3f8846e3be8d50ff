//! Search limits and parameters.

use crate::error::{CpError, Result};

/// Configuration for depth-first search.
///
/// All limits use 0 for "no limit".
///
/// # Examples
///
/// ```
/// use u_cpsolve::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_solution_limit(1)
///     .with_fail_limit(10_000)
///     .with_afc_decay(0.99);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Stop after this many solutions. 0 = enumerate all.
    pub solution_limit: usize,

    /// Maximum number of explored nodes. 0 = no limit.
    pub node_limit: u64,

    /// Maximum number of failed nodes. 0 = no limit.
    pub fail_limit: u64,

    /// Wall-clock budget in milliseconds. 0 = no limit.
    pub time_limit_ms: u64,

    /// Decay applied to accumulated failure counts at each failure, in
    /// `(0, 1]`. 1 keeps plain failure counts.
    pub afc_decay: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            solution_limit: 0,
            node_limit: 0,
            fail_limit: 0,
            time_limit_ms: 0,
            afc_decay: 1.0,
        }
    }
}

impl SearchConfig {
    /// Configuration that stops at the first solution.
    pub fn first_solution() -> Self {
        Self::default().with_solution_limit(1)
    }

    pub fn with_solution_limit(mut self, n: usize) -> Self {
        self.solution_limit = n;
        self
    }

    pub fn with_node_limit(mut self, n: u64) -> Self {
        self.node_limit = n;
        self
    }

    pub fn with_fail_limit(mut self, n: u64) -> Self {
        self.fail_limit = n;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_afc_decay(mut self, decay: f64) -> Self {
        self.afc_decay = decay;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.afc_decay > 0.0 && self.afc_decay <= 1.0) {
            return Err(CpError::InvalidConfig(format!(
                "afc_decay must be in (0, 1], got {}",
                self.afc_decay
            )));
        }
        Ok(())
    }
}
