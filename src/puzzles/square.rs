//! Packing squares of sizes `n, n-1, …, 2` into the smallest enclosing square.
//!
//! The unit square always fits in a leftover gap and is left out. Overlap is
//! ruled out by a single [`NoOverlap`](crate::propagators::NoOverlap)
//! propagator; the rest are bounds on coordinates plus a few dominance
//! rules that cut symmetric or wasteful placements.

use crate::branch::{BranchConfig, ValSelection, VarSelection};
use crate::error::{CpError, Result};
use crate::propagators::Relation;
use crate::space::Space;
use crate::var::{limits, DomainFailure, VarId};
use std::fmt;
use tracing::debug;

/// Coordinates that a square of side `s` may not take, counted from the
/// left or top border. A gap that narrow next to the border can only hold
/// smaller squares whose arrangement is dominated by one flush with the
/// border.
pub fn forbidden_border_gaps(s: i64) -> &'static [i64] {
    match s {
        45 => &[10],
        34.. => &[9],
        30.. => &[8],
        22.. => &[7],
        18.. => &[6],
        12.. => &[5],
        9.. => &[4],
        5.. => &[3],
        4 => &[2],
        3 => &[2, 3],
        2 => &[1, 2],
        _ => &[],
    }
}

/// The square packing model: one side variable and per-square coordinates.
#[derive(Debug, Clone)]
pub struct SquarePacking {
    side: VarId,
    x: Vec<VarId>,
    y: Vec<VarId>,
    sizes: Vec<i64>,
}

impl SquarePacking {
    /// Posts the packing of squares `n..=2`.
    ///
    /// The side ranges from `⌊√(Σ i²)⌋` (area bound) to `n(n+1)/2` (all
    /// squares in a row). Branching assigns the side first, smallest value
    /// first, then the x coordinates and then the y coordinates, each
    /// taking the variable with the largest lower bound and trying its
    /// smallest value.
    pub fn post(space: &mut Space, n: usize) -> Result<Self> {
        if n < 2 {
            return Err(CpError::InvalidModel(format!(
                "square packing needs n >= 2, got {n}"
            )));
        }
        let (n_i, side_max) = i64::try_from(n)
            .ok()
            .and_then(|n_i| Some((n_i, n_i.checked_mul(n_i.checked_add(1)?)? / 2)))
            .filter(|&(_, side_max)| limits::in_range(side_max))
            .ok_or_else(|| {
                CpError::InvalidModel(format!("square packing of n = {n} exceeds the value limits"))
            })?;
        let sizes: Vec<i64> = (0..n_i - 1).map(|i| n_i - i).collect();
        // Σ i² <= (Σ i)², which fits once side_max is within the limits
        let area: i64 = (1..=n_i).map(|i| i * i).sum();
        let side = space.int_var(isqrt(area), side_max)?;
        let x = space.int_vars(sizes.len(), 0, side_max - 1)?;
        let y = space.int_vars(sizes.len(), 0, side_max - 1)?;

        // x_i + s_i <= side, same for y
        for (i, &s) in sizes.iter().enumerate() {
            space.linear(&[1, -1], &[x[i], side], Relation::Le, -s)?;
            space.linear(&[1, -1], &[y[i], side], Relation::Le, -s)?;
        }

        space.rel(y[0], Relation::Le, x[0])?;
        if let Err(failure) = prune_root(space, &x, &y, &sizes, side_max) {
            debug!(event = "root_failed", model = "square_packing", %failure);
        }

        space.no_overlap(&x, &sizes, &y, &sizes)?;

        space.branch(
            &[side],
            BranchConfig::new(VarSelection::Lexicographic, ValSelection::Min),
        )?;
        let coords = BranchConfig::new(VarSelection::MinMax, ValSelection::Min);
        space.branch(&x, coords)?;
        space.branch(&y, coords)?;

        Ok(Self { side, x, y, sizes })
    }

    pub fn side(&self) -> VarId {
        self.side
    }

    pub fn sizes(&self) -> &[i64] {
        &self.sizes
    }

    /// Extracts the placement from a solved space.
    pub fn packing(&self, space: &Space) -> Option<Packing> {
        let side = space.val(self.side)?;
        let squares = self
            .sizes
            .iter()
            .enumerate()
            .map(|(i, &s)| Some(Placed {
                x: space.val(self.x[i])?,
                y: space.val(self.y[i])?,
                size: s,
            }))
            .collect::<Option<Vec<_>>>()?;
        Some(Packing { side, squares })
    }
}

/// Dominance pruning on the root domains: the largest square sits in the
/// lower-left triangle of the lower-left quadrant, and no square leaves a
/// forbidden gap to the border. On failure `space` is left failed, which
/// search reports as having no solution.
fn prune_root(
    space: &mut Space,
    x: &[VarId],
    y: &[VarId],
    sizes: &[i64],
    side_max: i64,
) -> std::result::Result<(), DomainFailure> {
    space.dom(x[0], 0, 1 + (side_max - sizes[0]) / 2)?;
    for (i, &s) in sizes.iter().enumerate() {
        for &gap in forbidden_border_gaps(s) {
            space.exclude(x[i], gap)?;
            space.exclude(y[i], gap)?;
        }
    }
    Ok(())
}

fn isqrt(n: i64) -> i64 {
    let mut r = (n as f64).sqrt() as i64;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}

/// One placed square, by its upper-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placed {
    pub x: i64,
    pub y: i64,
    pub size: i64,
}

impl Placed {
    fn overlaps(&self, other: &Placed) -> bool {
        self.x < other.x + other.size
            && other.x < self.x + self.size
            && self.y < other.y + other.size
            && other.y < self.y + self.size
    }
}

/// A complete packing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packing {
    pub side: i64,
    pub squares: Vec<Placed>,
}

impl Packing {
    /// Whether every square lies inside the enclosing square and no two
    /// squares share area.
    pub fn is_valid(&self) -> bool {
        let inside = self.squares.iter().all(|q| {
            q.x >= 0 && q.y >= 0 && q.x + q.size <= self.side && q.y + q.size <= self.side
        });
        let disjoint = self.squares.iter().enumerate().all(|(i, a)| {
            self.squares[i + 1..].iter().all(|b| !a.overlaps(b))
        });
        inside && disjoint
    }
}

impl fmt::Display for Packing {
    /// Draws the enclosing square, each cell showing the index of the
    /// square covering it (`.` when empty).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.side {
            for col in 0..self.side {
                let owner = self.squares.iter().position(|q| {
                    (q.x..q.x + q.size).contains(&col) && (q.y..q.y + q.size).contains(&row)
                });
                match owner {
                    Some(i) => write!(f, "{:>2}", i % 100)?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchConfig, SearchRunner};
    use crate::space::SpaceStatus;

    fn first_packing(n: usize) -> Packing {
        let mut space = Space::new();
        let model = SquarePacking::post(&mut space, n).unwrap();
        let solution = SearchRunner::first(space, &SearchConfig::default())
            .unwrap()
            .expect("packing exists");
        model.packing(&solution).unwrap()
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(14), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(30), 5);
        assert_eq!(isqrt(91), 9);
    }

    #[test]
    fn test_gap_table() {
        assert_eq!(forbidden_border_gaps(2), &[1, 2]);
        assert_eq!(forbidden_border_gaps(3), &[2, 3]);
        assert_eq!(forbidden_border_gaps(7), &[3]);
        assert_eq!(forbidden_border_gaps(45), &[10]);
        assert_eq!(forbidden_border_gaps(50), &[9]);
        assert!(forbidden_border_gaps(1).is_empty());
    }

    #[test]
    fn test_smallest_instances() {
        let p = first_packing(2);
        assert_eq!(p.side, 2);
        assert!(p.is_valid());

        let p = first_packing(3);
        assert_eq!(p.side, 5);
        assert!(p.is_valid());
    }

    #[test]
    fn test_four_needs_side_seven() {
        let p = first_packing(4);
        assert_eq!(p.side, 7);
        assert!(p.is_valid());
        assert_eq!(p.squares.len(), 3);
    }

    #[test]
    fn test_symmetry_breaking_holds() {
        let p = first_packing(4);
        let big = p.squares[0];
        assert!(big.y <= big.x);
    }

    #[test]
    fn test_invalid_n() {
        let mut space = Space::new();
        assert!(SquarePacking::post(&mut space, 1).is_err());
        assert!(matches!(
            SquarePacking::post(&mut space, 1 << 20),
            Err(CpError::InvalidModel(_))
        ));
        assert_eq!(space.var_count(), 0);
    }

    #[test]
    fn test_root_pruning() {
        let mut space = Space::new();
        let x = space.int_vars(2, 0, 9).unwrap();
        let y = space.int_vars(2, 0, 9).unwrap();
        prune_root(&mut space, &x, &y, &[4, 3], 10).unwrap();
        assert_eq!(space.var(x[0]).to_string(), "{0..1,3..4}");
        assert_eq!(space.var(y[1]).to_string(), "{0..1,4..9}");
        assert!(!space.is_failed());
    }

    #[test]
    fn test_root_pruning_failure_leaves_space_failed() {
        // x0 is squeezed to {1}, which is a forbidden gap for size 2.
        let mut space = Space::new();
        let x = space.int_vars(1, 1, 2).unwrap();
        let y = space.int_vars(1, 0, 3).unwrap();
        assert!(prune_root(&mut space, &x, &y, &[2], 3).is_err());
        assert!(space.is_failed());
        assert_eq!(space.status(), SpaceStatus::Failed);
    }

    #[test]
    fn test_display() {
        let p = Packing {
            side: 3,
            squares: vec![Placed { x: 0, y: 0, size: 2 }],
        };
        assert_eq!(p.to_string(), " 0 0 .\n 0 0 .\n . . .\n");
        assert!(p.is_valid());
    }

    #[test]
    fn test_overlap_detected() {
        let p = Packing {
            side: 4,
            squares: vec![
                Placed { x: 0, y: 0, size: 2 },
                Placed { x: 1, y: 1, size: 2 },
            ],
        };
        assert!(!p.is_valid());
    }
}
