//! Value limits for variables and constraint parameters.
//!
//! Every variable bound, rectangle size and linear coefficient must lie in
//! `[MIN, MAX]`. Within these limits the kernel's bound arithmetic
//! (`max + width`, `hi - lo`, `a * x`) cannot overflow `i64`, so
//! propagation never has to check it. Out-of-range input is rejected when
//! the variable is created or the constraint is posted.

use crate::error::{CpError, Result};

/// Largest value a variable or constraint parameter may take.
pub const MAX: i64 = i32::MAX as i64 - 1;

/// Smallest value a variable or constraint parameter may take.
pub const MIN: i64 = -MAX;

/// Whether `value` lies within the limits.
pub fn in_range(value: i64) -> bool {
    (MIN..=MAX).contains(&value)
}

/// Checks `value`, naming it `what` in the error.
pub fn check(value: i64, what: &'static str) -> Result<()> {
    if in_range(value) {
        Ok(())
    } else {
        Err(CpError::OutOfLimits { what, value })
    }
}

/// Checks that `value` is a size in `0..=MAX`.
pub fn check_size(value: i64, what: &'static str) -> Result<()> {
    if (0..=MAX).contains(&value) {
        Ok(())
    } else {
        Err(CpError::OutOfLimits { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_symmetric() {
        assert_eq!(MIN, -MAX);
        assert!(in_range(MAX));
        assert!(in_range(MIN));
        assert!(!in_range(MAX + 1));
        assert!(!in_range(MIN - 1));
    }

    #[test]
    fn test_check() {
        assert!(check(-5, "value").is_ok());
        assert_eq!(
            check(i64::MAX, "coefficient"),
            Err(CpError::OutOfLimits {
                what: "coefficient",
                value: i64::MAX
            })
        );
        assert!(check_size(0, "width").is_ok());
        assert!(check_size(-1, "width").is_err());
    }

    #[test]
    fn test_extreme_sums_fit() {
        // bound plus size, and coefficient times value, stay representable
        assert!(MAX.checked_add(MAX).is_some());
        assert!(MAX.checked_mul(MIN).is_some());
        assert!(MAX.checked_sub(MIN).is_some());
    }
}
